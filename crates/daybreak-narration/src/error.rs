//! Narration error types.
//!
//! These are logged, never shown: a failed generative path falls back to the
//! local synthesizer, and a failed local synthesizer is only logged.

use daybreak_core::{NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("No credential configured for generative speech")]
    MissingCredential,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No audio data received")]
    EmptyAudio,

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

impl From<reqwest::Error> for NarrationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}
