//! Spoken readout for Daybreak.
//!
//! Text is first sent to a generative audio provider; the raw PCM it returns
//! is decoded and played. If that path fails for any reason the text is spoken
//! by the local synthesizer instead, with a ranked choice of voice.

pub mod error;
pub mod local;
pub mod output;
pub mod pcm;
pub mod service;
pub mod speech;
pub mod voice;

pub use error::NarrationError;
pub use local::{EspeakSynthesizer, LocalSynthesizer};
pub use output::{AudioOutput, CommandAudioOutput};
pub use pcm::{decode_pcm16, PcmBuffer, CHANNELS, SAMPLE_RATE};
pub use service::NarrationService;
pub use speech::SpeechClient;
pub use voice::{select_voice, Utterance, Voice};
