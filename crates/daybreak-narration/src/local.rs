//! Local speech synthesis through espeak-ng.

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::NarrationError;
use crate::output::run_with_stdin;
use crate::voice::{Utterance, Voice};

/// espeak-ng defaults: 175 words per minute, pitch 50 of 0-99
const BASE_RATE_WPM: f32 = 175.0;
const BASE_PITCH: f32 = 50.0;
const DEFAULT_VOICE_ID: &str = "en-us";

/// Offline synthesizer used when generative speech is unavailable
#[async_trait]
pub trait LocalSynthesizer: Send + Sync {
    /// Voices known right now; empty until the catalog has loaded.
    fn voices(&self) -> Vec<Voice>;

    /// Resolves once the voice catalog has been (re)loaded.
    async fn voices_changed(&self);

    /// Speak the utterance and wait until it has been spoken.
    async fn speak(&self, utterance: Utterance) -> Result<(), NarrationError>;
}

pub struct EspeakSynthesizer {
    program: String,
    voices: RwLock<Vec<Voice>>,
}

impl EspeakSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            voices: RwLock::new(Vec::new()),
        }
    }

    async fn load_catalog(&self) -> Result<Vec<Voice>, NarrationError> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .output()
            .await
            .map_err(|e| NarrationError::Synthesis(format!("failed to start {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(NarrationError::Synthesis(format!(
                "{} --voices exited with {}",
                self.program, output.status
            )));
        }

        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new("espeak-ng")
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US           (en 10)
/// ```
fn parse_voice_list(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let language = columns.next()?;
            let _age_gender = columns.next()?;
            let name = columns.next()?;
            Some(Voice::new(
                language,
                name.replace('_', " "),
                normalize_language_tag(language),
            ))
        })
        .collect()
}

/// `en-us` -> `en-US`, `en-gb-x-rp` -> `en-GB-x-rp`
fn normalize_language_tag(tag: &str) -> String {
    tag.split('-')
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_lowercase()
            } else if part.len() == 2 {
                part.to_uppercase()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn speak_args(utterance: &Utterance) -> Vec<String> {
    let voice = utterance
        .voice
        .as_ref()
        .map_or(DEFAULT_VOICE_ID, |v| v.id.as_str());
    let rate = (BASE_RATE_WPM * utterance.rate).round() as u32;
    let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0) as u32;

    vec![
        "-v".to_string(),
        voice.to_string(),
        "-s".to_string(),
        rate.to_string(),
        "-p".to_string(),
        pitch.to_string(),
        "--stdin".to_string(),
    ]
}

#[async_trait]
impl LocalSynthesizer for EspeakSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.read().clone()
    }

    async fn voices_changed(&self) {
        match self.load_catalog().await {
            Ok(catalog) => {
                info!("Loaded {} local voices", catalog.len());
                *self.voices.write() = catalog;
            }
            Err(e) => warn!("Could not list local voices: {}", e),
        }
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), NarrationError> {
        let args = speak_args(&utterance);
        debug!(program = %self.program, ?args, "Speaking with local synthesizer");

        run_with_stdin(&self.program, &args, utterance.text.as_bytes())
            .await
            .map_err(NarrationError::Synthesis)
    }
}
