use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";
pub const PLAYER_PARAMS: &str = "?autoplay=1&rel=0&showinfo=0";
pub const OVERLAY_TEXT: &str = "Tap to play ▶";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbedError {
    #[error("invalid video URL: {0}")]
    InvalidUrl(String),
}

impl EmbedError {
    pub fn alert_text(&self) -> &str {
        match self {
            EmbedError::InvalidUrl(_) => "Invalid YouTube URL.",
        }
    }
}

/// Turn a shareable YouTube link into its embed form.
///
/// `youtu.be/<id>` and `youtube.com/watch?v=<id>` are recognized. Hosts are
/// matched by containment, so `m.youtube.com` and `www.youtu.be` work too.
pub fn to_embed_url(link: &str) -> Result<String, EmbedError> {
    let invalid = || EmbedError::InvalidUrl(link.to_string());

    let url = Url::parse(link).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?;

    let id = if host.contains("youtu.be") {
        let path = url.path();
        path.strip_prefix('/').unwrap_or(path).to_string()
    } else if host.contains("youtube.com") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default()
    } else {
        return Err(invalid());
    };

    if id.is_empty() {
        return Err(invalid());
    }

    Ok(format!("{}{}", EMBED_BASE, id))
}

/// Embed URL with the autoplay parameters the modal player uses.
pub fn player_url(link: &str) -> Result<String, EmbedError> {
    Ok(to_embed_url(link)? + PLAYER_PARAMS)
}

/// A project entry as listed in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCard {
    pub title: String,
    pub href: Option<String>,
    overlay_visible: bool,
}

impl ProjectCard {
    pub fn new(title: impl Into<String>, href: Option<String>) -> Self {
        Self {
            title: title.into(),
            href,
            overlay_visible: false,
        }
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Caption painted over the thumbnail while the overlay shows.
    pub fn overlay_text(&self) -> Option<&str> {
        self.overlay_visible.then_some(OVERLAY_TEXT)
    }

    pub fn on_hover(&mut self) {
        self.overlay_visible = true;
    }

    pub fn on_leave(&mut self) {
        self.overlay_visible = false;
    }

    pub fn on_focus(&mut self) {
        self.overlay_visible = true;
    }

    pub fn on_blur(&mut self) {
        self.overlay_visible = false;
    }
}

impl From<&Project> for ProjectCard {
    fn from(project: &Project) -> Self {
        ProjectCard::new(project.title.clone(), Some(project.url.clone()))
    }
}

/// Where a click inside the modal landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    CloseButton,
    Backdrop,
    Content,
}

/// The single video player overlay shared by all project cards
#[derive(Debug, Clone, Default)]
pub struct VideoModal {
    active: bool,
    src: String,
    last_focused: Option<String>,
}

impl VideoModal {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current iframe source, empty while closed.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Play the card's video.
    ///
    /// A card without a link is ignored (`Ok(None)`). An unusable link
    /// leaves the modal closed.
    pub fn open(&mut self, card: &ProjectCard) -> Result<Option<&str>, EmbedError> {
        let Some(href) = card.href.as_deref() else {
            return Ok(None);
        };

        let src = player_url(href).map_err(|e| {
            warn!(card = %card.title, href, "project link is not a YouTube video");
            e
        })?;

        self.src = src;
        self.active = true;
        self.last_focused = Some(card.title.clone());
        debug!(card = %card.title, src = %self.src, "video modal opened");

        Ok(Some(self.src.as_str()))
    }

    /// Stop playback and hide the modal.
    ///
    /// Returns the card that should get focus back.
    pub fn close(&mut self) -> Option<String> {
        self.src.clear();
        self.active = false;
        debug!("video modal closed");
        self.last_focused.take()
    }

    pub fn handle_key(&mut self, key: &str) -> Option<String> {
        if key == "Escape" && self.active {
            return self.close();
        }
        None
    }

    pub fn handle_click(&mut self, target: ClickTarget) -> Option<String> {
        match target {
            ClickTarget::CloseButton | ClickTarget::Backdrop => self.close(),
            ClickTarget::Content => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link() {
        assert_eq!(
            to_embed_url("https://youtu.be/abc123").unwrap(),
            "https://www.youtube.com/embed/abc123"
        );
    }

    #[test]
    fn test_watch_link() {
        assert_eq!(
            to_embed_url("https://www.youtube.com/watch?v=abc123").unwrap(),
            "https://www.youtube.com/embed/abc123"
        );
        assert_eq!(
            to_embed_url("https://m.youtube.com/watch?list=x&v=abc123&t=4").unwrap(),
            "https://www.youtube.com/embed/abc123"
        );
    }

    #[test]
    fn test_rejected_links() {
        for link in [
            "https://vimeo.com/12345",
            "https://www.youtube.com/watch",
            "https://youtu.be/",
            "not a url",
            "",
        ] {
            assert_eq!(
                to_embed_url(link),
                Err(EmbedError::InvalidUrl(link.to_string())),
                "{link}"
            );
        }
    }

    #[test]
    fn test_player_url() {
        assert_eq!(
            player_url("https://youtu.be/xyz").unwrap(),
            "https://www.youtube.com/embed/xyz?autoplay=1&rel=0&showinfo=0"
        );
    }

    #[test]
    fn test_overlay_follows_hover_and_focus() {
        let mut card = ProjectCard::new("Snake", None);
        assert!(!card.overlay_visible());
        assert_eq!(card.overlay_text(), None);
        card.on_hover();
        assert!(card.overlay_visible());
        assert_eq!(card.overlay_text(), Some("Tap to play ▶"));
        card.on_leave();
        assert!(!card.overlay_visible());
        card.on_focus();
        assert!(card.overlay_visible());
        card.on_blur();
        assert!(!card.overlay_visible());
    }

    #[test]
    fn test_modal_open_and_close() {
        let mut modal = VideoModal::default();
        let card = ProjectCard::from(&Project {
            title: "Traffic Simulation".to_string(),
            url: "https://youtu.be/abc123".to_string(),
        });

        let src = modal.open(&card).unwrap().map(str::to_string);
        assert_eq!(
            src.as_deref(),
            Some("https://www.youtube.com/embed/abc123?autoplay=1&rel=0&showinfo=0")
        );
        assert!(modal.is_active());

        // clicks inside the player do nothing
        assert_eq!(modal.handle_click(ClickTarget::Content), None);
        assert!(modal.is_active());

        assert_eq!(modal.handle_key("Escape"), Some("Traffic Simulation".to_string()));
        assert!(!modal.is_active());
        assert_eq!(modal.src(), "");

        // Escape while closed is ignored
        assert_eq!(modal.handle_key("Escape"), None);
    }

    #[test]
    fn test_modal_backdrop_click_closes() {
        let mut modal = VideoModal::default();
        let card = ProjectCard::new("Game", Some("https://www.youtube.com/watch?v=q".to_string()));
        modal.open(&card).unwrap();
        assert_eq!(modal.handle_click(ClickTarget::Backdrop), Some("Game".to_string()));
        assert!(!modal.is_active());
    }

    #[test]
    fn test_modal_ignores_bad_cards() {
        let mut modal = VideoModal::default();

        let no_link = ProjectCard::new("Draft", None);
        assert_eq!(modal.open(&no_link), Ok(None));
        assert!(!modal.is_active());

        let bad = ProjectCard::new("Elsewhere", Some("https://example.com/v".to_string()));
        let err = modal.open(&bad).unwrap_err();
        assert_eq!(err.alert_text(), "Invalid YouTube URL.");
        assert!(!modal.is_active());
        assert_eq!(modal.close(), None);
    }
}
