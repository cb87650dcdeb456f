use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use super::chat::{ChatMessage, ChatSession};

pub const DEFAULT_LANG: &str = "en-US";
pub const UNSUPPORTED_NOTICE: &str = "Voice recognition is not supported in your browser.";

/// Error code reported when the recognizer heard nothing.
pub const NO_SPEECH: &str = "no-speech";
/// Error code reported when the audio source went away.
pub const ABORTED: &str = "aborted";
/// Error code reported when speech was heard but not understood.
pub const NO_MATCH: &str = "no-match";

/// Parameters of one recognition request.
///
/// Always single-shot: one final result, no interim transcripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionRequest {
    pub lang: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for RecognitionRequest {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoiceError {
    #[error("voice recognition is not supported")]
    Unsupported,

    #[error("voice input is disabled for this session")]
    Disabled,

    #[error("voice recognition failed: {0}")]
    Recognition(String),
}

impl VoiceError {
    /// The audio source is gone for good.
    pub fn is_aborted(&self) -> bool {
        matches!(self, VoiceError::Recognition(code) if code == ABORTED)
    }

    /// Alert shown to the visitor. `Disabled` is silent, the unsupported
    /// notice was already shown when voice got switched off.
    pub fn alert_text(&self) -> Option<String> {
        match self {
            VoiceError::Unsupported => Some(UNSUPPORTED_NOTICE.to_string()),
            VoiceError::Disabled => None,
            VoiceError::Recognition(code) => Some(format!("Voice recognition error: {}", code)),
        }
    }
}

/// A speech-to-text backend
#[allow(async_fn_in_trait)]
pub trait SpeechRecognizer {
    fn is_supported(&self) -> bool;

    /// Listen once and return the best transcript.
    async fn recognize(&mut self, request: &RecognitionRequest) -> Result<String, VoiceError>;
}

/// Push-to-talk microphone button
pub struct VoiceInput<R> {
    recognizer: R,
    request: RecognitionRequest,
    disabled: bool,
}

impl<R: SpeechRecognizer> VoiceInput<R> {
    pub fn new(recognizer: R, request: RecognitionRequest) -> Self {
        Self {
            recognizer,
            request,
            disabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn request(&self) -> &RecognitionRequest {
        &self.request
    }

    /// Run one recognition request.
    ///
    /// An unsupported recognizer turns voice input off for the rest of the
    /// session: the first call reports `Unsupported`, later ones `Disabled`.
    pub async fn listen(&mut self) -> Result<String, VoiceError> {
        if self.disabled {
            return Err(VoiceError::Disabled);
        }
        if !self.recognizer.is_supported() {
            warn!("speech recognition unavailable, disabling voice input");
            self.disabled = true;
            return Err(VoiceError::Unsupported);
        }

        let transcript = self.recognizer.recognize(&self.request).await?;
        debug!(lang = %self.request.lang, transcript = %transcript, "speech recognized");
        Ok(transcript)
    }

    /// Recognize a phrase and send it to the chat as if typed.
    pub async fn send_to(&mut self, session: &mut ChatSession) -> Result<Option<ChatMessage>, VoiceError> {
        let transcript = self.listen().await?;
        Ok(session.send_message(&transcript).await)
    }
}

/// Recognizer that takes each line of a reader as a spoken phrase.
///
/// Stands in for a microphone in terminals and pipes.
pub struct LineRecognizer<Rd> {
    reader: Rd,
}

impl<Rd> LineRecognizer<Rd> {
    pub fn new(reader: Rd) -> Self {
        Self { reader }
    }
}

impl<Rd: AsyncBufRead + Unpin> SpeechRecognizer for LineRecognizer<Rd> {
    fn is_supported(&self) -> bool {
        true
    }

    /// A failing reader never recovers, so read errors end the session
    /// like end of input does.
    async fn recognize(&mut self, _request: &RecognitionRequest) -> Result<String, VoiceError> {
        let mut bytes = Vec::new();
        let read = self.reader.read_until(b'\n', &mut bytes).await.map_err(|e| {
            warn!(error = %e, "failed to read transcript");
            VoiceError::Recognition(ABORTED.to_string())
        })?;

        if read == 0 {
            return Err(VoiceError::Recognition(ABORTED.to_string()));
        }
        let Ok(line) = String::from_utf8(bytes) else {
            warn!("transcript is not valid UTF-8");
            return Err(VoiceError::Recognition(NO_MATCH.to_string()));
        };
        let transcript = line.trim();
        if transcript.is_empty() {
            return Err(VoiceError::Recognition(NO_SPEECH.to_string()));
        }
        Ok(transcript.to_string())
    }
}
