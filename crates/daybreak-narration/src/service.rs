//! Narration with generative speech first and local synthesis as fallback.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::error::NarrationError;
use crate::local::LocalSynthesizer;
use crate::output::AudioOutput;
use crate::pcm::decode_pcm16;
use crate::speech::SpeechClient;
use crate::voice::{select_voice, Utterance};

/// How long to wait for the local voice catalog before speaking anyway
pub const DEFAULT_VOICE_WAIT: Duration = Duration::from_millis(1000);

pub struct NarrationService {
    speech: SpeechClient,
    output: Arc<dyn AudioOutput>,
    local: Arc<dyn LocalSynthesizer>,
    voice_wait: Duration,
}

impl NarrationService {
    pub fn new(
        speech: SpeechClient,
        output: Arc<dyn AudioOutput>,
        local: Arc<dyn LocalSynthesizer>,
    ) -> Self {
        Self {
            speech,
            output,
            local,
            voice_wait: DEFAULT_VOICE_WAIT,
        }
    }

    pub fn with_voice_wait(mut self, voice_wait: Duration) -> Self {
        self.voice_wait = voice_wait;
        self
    }

    /// Speak `text`. Never fails: errors are logged and the local
    /// synthesizer is used exactly once when the generative path fails.
    #[instrument(skip(self, text), fields(chars = text.len()), level = "info")]
    pub async fn speak(&self, text: &str) {
        match self.speak_generative(text).await {
            Ok(()) => info!("Narration played"),
            Err(e) => {
                warn!("Generative speech failed, using local voice: {}", e);
                self.speak_local(text).await;
            }
        }
    }

    async fn speak_generative(&self, text: &str) -> Result<(), NarrationError> {
        let payload = self.speech.synthesize(text).await?;
        let buffer = decode_pcm16(&payload)?;
        self.output.play(&buffer).await
    }

    async fn speak_local(&self, text: &str) {
        let mut voices = self.local.voices();
        if voices.is_empty() {
            if tokio::time::timeout(self.voice_wait, self.local.voices_changed())
                .await
                .is_err()
            {
                warn!("Local voice catalog not ready, using default voice");
            }
            voices = self.local.voices();
        }

        let voice = select_voice(&voices).cloned();
        if let Some(v) = &voice {
            info!(voice = %v.name, lang = %v.lang, "Selected local voice");
        }

        let utterance = Utterance::new(text).with_voice(voice);
        if let Err(e) = self.local.speak(utterance).await {
            warn!("Local speech failed: {}", e);
        }
    }
}
