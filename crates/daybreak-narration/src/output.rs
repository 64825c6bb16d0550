//! Raw PCM playback through a system audio player.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::NarrationError;
use crate::pcm::PcmBuffer;

/// Sink for decoded speech
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Play the whole buffer, returning once playback has finished.
    async fn play(&self, buffer: &PcmBuffer) -> Result<(), NarrationError>;
}

/// Pipes s16le samples into `aplay` or `paplay`.
pub struct CommandAudioOutput {
    program: String,
}

impl CommandAudioOutput {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandAudioOutput {
    fn default() -> Self {
        Self::new("aplay")
    }
}

/// Arguments telling the player to read raw PCM from stdin
fn player_args(program: &str, sample_rate: u32, channels: u16) -> Vec<String> {
    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);

    if name == "paplay" {
        vec![
            "--raw".to_string(),
            "--format=s16le".to_string(),
            format!("--rate={sample_rate}"),
            format!("--channels={channels}"),
        ]
    } else {
        vec![
            "-q".to_string(),
            "-t".to_string(),
            "raw".to_string(),
            "-f".to_string(),
            "S16_LE".to_string(),
            "-r".to_string(),
            sample_rate.to_string(),
            "-c".to_string(),
            channels.to_string(),
            "-".to_string(),
        ]
    }
}

/// Spawn `program`, write `input` to its stdin and wait for it to exit.
pub(crate) async fn run_with_stdin(
    program: &str,
    args: &[String],
    input: &[u8],
) -> Result<(), String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("failed to start {program}: {e}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input)
            .await
            .map_err(|e| format!("failed to write to {program}: {e}"))?;
        // Closing stdin signals end of input
        drop(stdin);
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| format!("{program} did not finish: {e}"))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("{program} exited with {}: {}", output.status, stderr.trim()))
    }
}

#[async_trait]
impl AudioOutput for CommandAudioOutput {
    async fn play(&self, buffer: &PcmBuffer) -> Result<(), NarrationError> {
        let args = player_args(&self.program, buffer.sample_rate, buffer.channels);
        debug!(
            player = %self.program,
            secs = buffer.duration_secs(),
            "Playing generated speech"
        );

        run_with_stdin(&self.program, &args, &buffer.to_s16le_bytes())
            .await
            .map_err(NarrationError::Playback)
    }
}
