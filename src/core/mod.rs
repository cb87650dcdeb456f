pub mod chat;
pub mod contact;
pub mod error;
pub mod progress;
pub mod video;
pub mod voice;

pub use chat::{ChatMessage, ChatPanel, ChatSession, Category, KeywordResponder, KeywordRule, Sender};
pub use contact::{ContactForm, ContactSubmitter, Field, SubmitError, ValidationError};
pub use error::{PortfolioError, Result};
pub use progress::{ProgressAnimator, ProgressFrame, ProgressTarget, ProgressTiming};
pub use video::{EmbedError, Project, ProjectCard, VideoModal};
pub use voice::{LineRecognizer, RecognitionRequest, SpeechRecognizer, VoiceError, VoiceInput};
