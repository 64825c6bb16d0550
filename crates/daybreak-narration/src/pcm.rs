use base64::Engine;

use crate::error::NarrationError;

/// Sample rate of generated speech
pub const SAMPLE_RATE: u32 = 24_000;
/// Generated speech is mono
pub const CHANNELS: u16 = 1;

/// Decoded audio, samples normalized to [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    /// Back to signed 16-bit little-endian bytes for players that want raw PCM
    pub fn to_s16le_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|s| {
                let value = (s * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
                value.to_le_bytes()
            })
            .collect()
    }
}

/// Decode base64 raw PCM (s16le, mono, 24 kHz) into normalized samples.
///
/// Each sample is divided by 32768. A trailing odd byte is ignored.
pub fn decode_pcm16(base64_audio: &str) -> Result<PcmBuffer, NarrationError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(base64_audio.trim())
        .map_err(|e| NarrationError::Decode(e.to_string()))?;

    if bytes.len() < 2 {
        return Err(NarrationError::EmptyAudio);
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect();

    Ok(PcmBuffer {
        samples,
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(samples: &[i16]) -> String {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_normalizes_samples() {
        let buffer = decode_pcm16(&encode(&[0, 16384, -16384, i16::MIN, i16::MAX])).unwrap();

        assert_eq!(buffer.sample_rate, 24_000);
        assert_eq!(buffer.channels, 1);
        assert_eq!(buffer.samples[0], 0.0);
        assert_eq!(buffer.samples[1], 0.5);
        assert_eq!(buffer.samples[2], -0.5);
        assert_eq!(buffer.samples[3], -1.0);
        assert_eq!(buffer.samples[4], 32767.0 / 32768.0);
        assert!(buffer.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_is_little_endian() {
        // 0x0100 little-endian = 1
        let b64 = base64::engine::general_purpose::STANDARD.encode([0x01, 0x00]);
        let buffer = decode_pcm16(&b64).unwrap();
        assert_eq!(buffer.samples, vec![1.0 / 32768.0]);
    }

    #[test]
    fn test_trailing_odd_byte_ignored() {
        let b64 = base64::engine::general_purpose::STANDARD.encode([0x00, 0x40, 0x7f]);
        let buffer = decode_pcm16(&b64).unwrap();
        assert_eq!(buffer.samples, vec![0.5]);
    }

    #[test]
    fn test_decode_rejects_garbage_and_empty() {
        assert!(matches!(
            decode_pcm16("!!not base64!!"),
            Err(NarrationError::Decode(_))
        ));
        assert!(matches!(decode_pcm16(""), Err(NarrationError::EmptyAudio)));
    }

    #[test]
    fn test_duration_and_s16le_conversion() {
        let original = [1000i16, -1000, 0, i16::MAX];
        let buffer = decode_pcm16(&encode(&original)).unwrap();

        assert_eq!(buffer.frame_count(), 4);
        assert!((buffer.duration_secs() - 4.0 / 24_000.0).abs() < f64::EPSILON);

        let expected: Vec<u8> = original.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(buffer.to_s16le_bytes(), expected);
    }
}
