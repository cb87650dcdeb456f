use thiserror::Error;

use super::contact::{SubmitError, ValidationError};
use super::video::EmbedError;
use super::voice::VoiceError;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PortfolioError {
    /// Text shown to the visitor in a blocking alert.
    pub fn alert_text(&self) -> String {
        match self {
            PortfolioError::Embed(e) => e.alert_text().to_string(),
            PortfolioError::Validation(e) => e.alert_text().to_string(),
            PortfolioError::Voice(e) => e.alert_text().unwrap_or_else(|| e.to_string()),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
