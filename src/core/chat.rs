use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_REPLY_DELAY_MS: u64 = 500;

pub const FALLBACK_RESPONSE: &str = "Sorry, I didn't understand that. Could you rephrase?";

/// Keyword category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Greeting,
    Farewell,
    Skills,
    Projects,
    Contact,
    CodingProfiles,
    Help,
}

impl Category {
    pub fn name(&self) -> &str {
        match self {
            Category::Greeting => "greeting",
            Category::Farewell => "farewell",
            Category::Skills => "skills",
            Category::Projects => "projects",
            Category::Contact => "contact",
            Category::CodingProfiles => "codingProfiles",
            Category::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    pub trigger_words: Vec<String>,
    pub response: String,
}

impl KeywordRule {
    pub fn new(category: Category, trigger_words: &[&str], response: &str) -> Self {
        Self {
            category,
            trigger_words: trigger_words.iter().map(|w| w.to_lowercase()).collect(),
            response: response.to_string(),
        }
    }

    /// Substring test, not whole words: "high" contains "hi".
    ///
    /// `normalized` must already be lowercase. Rules loaded from config may
    /// carry mixed-case words, so those are lowered here.
    pub fn matches(&self, normalized: &str) -> bool {
        self.trigger_words
            .iter()
            .any(|word| normalized.contains(word.to_lowercase().as_str()))
    }
}

/// DevBot's rule table, highest priority first.
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            Category::Greeting,
            &["hi", "hello", "hey", "good morning", "good afternoon", "good evening"],
            "Hello! I'm DevBot 🤖. You can ask me about my projects, skills, or coding profiles.",
        ),
        KeywordRule::new(
            Category::Farewell,
            &["bye", "goodbye", "see you", "farewell"],
            "Goodbye! Feel free to chat anytime.",
        ),
        KeywordRule::new(
            Category::Skills,
            &["skills", "technology", "technologies", "stack"],
            "My skills include C, Java, HTML, CSS, JavaScript, Python, and more.",
        ),
        KeywordRule::new(
            Category::Projects,
            &["projects", "work", "portfolio"],
            "You can explore my projects section for websites, games, and simulations.",
        ),
        KeywordRule::new(
            Category::Contact,
            &["contact", "email", "phone", "reach"],
            "You can contact me via the form or email me at devashish8275@gmail.com.",
        ),
        KeywordRule::new(
            Category::CodingProfiles,
            &["hackerrank", "leetcode", "codechef"],
            "I am active on HackerRank, LeetCode, and CodeChef. Check the Coding Profiles section for links.",
        ),
        KeywordRule::new(
            Category::Help,
            &["help", "assist", "support", "question"],
            "I'm here to help! Try asking about my skills, projects, coding profiles, or contact info.",
        ),
    ]
}

/// Ordered keyword matcher. The first rule that matches answers.
#[derive(Debug, Clone)]
pub struct KeywordResponder {
    rules: Vec<KeywordRule>,
    fallback: String,
}

impl Default for KeywordResponder {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl KeywordResponder {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            fallback: FALLBACK_RESPONSE.to_string(),
        }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// The rule that answers `message`, if any.
    pub fn classify(&self, message: &str) -> Option<&KeywordRule> {
        let normalized = message.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&normalized))
    }

    pub fn respond(&self, message: &str) -> &str {
        match self.classify(message) {
            Some(rule) => {
                debug!(category = rule.category.name(), "keyword rule matched");
                &rule.response
            }
            None => {
                debug!("no keyword rule matched");
                &self.fallback
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }
}

/// Append-only display log of chat bubbles
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Where keyboard focus goes after the panel toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    ToggleButton,
    Unchanged,
}

/// Open/closed state of the floating chat box
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatPanel {
    open: bool,
}

impl ChatPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self, preserve_focus: bool) -> Focus {
        self.open = !self.open;
        debug!(open = self.open, "chat panel toggled");
        if self.open {
            Focus::Input
        } else if preserve_focus {
            Focus::Unchanged
        } else {
            Focus::ToggleButton
        }
    }
}

/// One visitor's conversation with DevBot
#[derive(Debug, Clone)]
pub struct ChatSession {
    responder: KeywordResponder,
    log: ChatLog,
    panel: ChatPanel,
    reply_delay: Duration,
}

impl ChatSession {
    pub fn new(responder: KeywordResponder, reply_delay: Duration) -> Self {
        Self {
            responder,
            log: ChatLog::default(),
            panel: ChatPanel::default(),
            reply_delay,
        }
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ChatPanel {
        &mut self.panel
    }

    /// Post the visitor's message and wait for DevBot's reply.
    ///
    /// Blank input is ignored and returns `None`.
    pub async fn send_message(&mut self, input: &str) -> Option<ChatMessage> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        self.log.push(ChatMessage::new(message, Sender::User));
        let reply = self.responder.respond(message).to_string();

        tokio::time::sleep(self.reply_delay).await;

        Some(self.log.push(ChatMessage::new(reply, Sender::Bot)).clone())
    }
}
