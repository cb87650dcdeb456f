use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1800;

pub const THANK_YOU_NOTICE: &str = "Thank you for reaching out! I will get back to you soon.";

const MIN_NAME_CHARS: usize = 3;
const MIN_MESSAGE_CHARS: usize = 10;

// Local part: dot-separated atoms or a quoted string. Domain: at least one
// label followed by a TLD of two or more characters.
const EMAIL_PATTERN: &str = r#"(?i)^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@(([^<>()\[\]\\.,;:\s@"]+\.)+[^<>()\[\]\\.,;:\s@"]{2,})$"#;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(&email.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    fn requirement(&self) -> &'static str {
        match self {
            Field::Name => "Please enter at least 3 characters for name.",
            Field::Email => "Please enter valid email address.",
            Field::Message => "Message should be at least 10 characters.",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    message: &'static str,
}

impl ValidationError {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            message: field.requirement(),
        }
    }

    pub fn alert_text(&self) -> &str {
        self.message
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("a message is already being sent")]
    AlreadySending,
}

/// The contact form's three fields plus its inline error marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    invalid: Option<Field>,
}

impl ContactForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            invalid: None,
        }
    }

    /// Field currently highlighted as wrong.
    pub fn invalid_field(&self) -> Option<Field> {
        self.invalid
    }

    /// Check name, email and message in that order, stopping at the first
    /// failure and marking that field.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.invalid = None;

        let failed = if self.name.trim().chars().count() < MIN_NAME_CHARS {
            Some(Field::Name)
        } else if !validate_email(self.email.trim()) {
            Some(Field::Email)
        } else if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            Some(Field::Message)
        } else {
            None
        };

        match failed {
            Some(field) => {
                debug!(field = field.name(), "contact form field rejected");
                self.invalid = Some(field);
                Err(ValidationError::new(field))
            }
            None => Ok(()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Sending,
}

impl SubmitState {
    /// Submit button caption.
    pub fn label(&self) -> &str {
        match self {
            SubmitState::Idle => "Send Message",
            SubmitState::Sending => "Sending...",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub name: String,
    pub email: String,
    pub notice: String,
    pub submitted_at: DateTime<Utc>,
}

/// Pretends to deliver contact messages after a fixed delay.
///
/// Nothing leaves the process. Only one submission may be in flight.
#[derive(Debug)]
pub struct ContactSubmitter {
    delay: Duration,
    sending: AtomicBool,
}

struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ContactSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sending: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SubmitState {
        if self.sending.load(Ordering::Acquire) {
            SubmitState::Sending
        } else {
            SubmitState::Idle
        }
    }

    /// Validate and "send" the form, resetting it once delivered.
    pub async fn submit(&self, form: &mut ContactForm) -> Result<SubmitReceipt, SubmitError> {
        form.validate()?;

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::AlreadySending);
        }
        let _guard = SendingGuard(&self.sending);

        info!(email = %form.email.trim(), "sending contact message");
        tokio::time::sleep(self.delay).await;

        let receipt = SubmitReceipt {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            notice: THANK_YOU_NOTICE.to_string(),
            submitted_at: Utc::now(),
        };
        form.reset();

        Ok(receipt)
    }
}

impl Default for ContactSubmitter {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SUBMIT_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co"));
        assert!(validate_email("First.Last@Example.COM"));
        assert!(validate_email("\"odd name\"@mail.example.org"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("a@b.c"));
        assert!(!validate_email("a..b@example.com"));
        assert!(!validate_email("a b@example.com"));
        assert!(!validate_email("@example.com"));
    }

    #[test]
    fn test_validation_stops_at_first_failure() {
        let mut form = ContactForm::new("Al", "nope", "short");
        let err = form.validate().unwrap_err();
        assert_eq!(err.field, Field::Name);
        assert_eq!(err.alert_text(), "Please enter at least 3 characters for name.");
        assert_eq!(form.invalid_field(), Some(Field::Name));
    }

    #[test]
    fn test_validation_trims_values() {
        let mut form = ContactForm::new("  Ada  ", " ada@example.com ", "          ");
        assert_eq!(form.validate().unwrap_err().field, Field::Message);

        form.message = "  Hello there, nice site  ".to_string();
        assert!(form.validate().is_ok());
        // markers are cleared on the next attempt
        assert_eq!(form.invalid_field(), None);
    }

    #[test]
    fn test_email_checked_before_message() {
        let mut form = ContactForm::new("Ada", "ada@", "");
        let err = form.validate().unwrap_err();
        assert_eq!(err.field, Field::Email);
        assert_eq!(err.to_string(), "Please enter valid email address.");
    }

    #[test]
    fn test_button_labels() {
        assert_eq!(SubmitState::Idle.label(), "Send Message");
        assert_eq!(SubmitState::Sending.label(), "Sending...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_resets_form() {
        let submitter = ContactSubmitter::default();
        let mut form = ContactForm::new("Ada", "ada@example.com", "Would love to collaborate!");

        let start = tokio::time::Instant::now();
        let receipt = submitter.submit(&mut form).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(DEFAULT_SUBMIT_DELAY_MS));
        assert_eq!(receipt.notice, THANK_YOU_NOTICE);
        assert_eq!(receipt.email, "ada@example.com");
        assert_eq!(form, ContactForm::default());
        assert_eq!(submitter.state(), SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let submitter = ContactSubmitter::new(Duration::ZERO);
        let mut form = ContactForm::new("Ada", "ada@example.com", "hi");

        let err = submitter.submit(&mut form).await.unwrap_err();
        assert_eq!(err, SubmitError::Invalid(ValidationError::new(Field::Message)));
        // nothing was cleared
        assert_eq!(form.message, "hi");
        assert_eq!(form.invalid_field(), Some(Field::Message));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submit_is_rejected() {
        let submitter = ContactSubmitter::default();
        let mut first = ContactForm::new("Ada", "ada@example.com", "First message here");
        let mut second = ContactForm::new("Bob", "bob@example.com", "Second message here");

        let (a, b) = tokio::join!(submitter.submit(&mut first), async {
            // let the first submission start before trying again
            tokio::task::yield_now().await;
            assert_eq!(submitter.state(), SubmitState::Sending);
            submitter.submit(&mut second).await
        });

        assert!(a.is_ok());
        assert_eq!(b, Err(SubmitError::AlreadySending));
        assert_eq!(second.name, "Bob");
        assert_eq!(submitter.state(), SubmitState::Idle);
    }
}
