use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::core::chat::{KeywordResponder, KeywordRule, DEFAULT_REPLY_DELAY_MS};
use crate::core::contact::{ContactSubmitter, DEFAULT_SUBMIT_DELAY_MS};
use crate::core::progress::ProgressTiming;
use crate::core::video::Project;
use crate::core::voice::RecognitionRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub progress: ProgressTiming,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub voice: RecognitionRequest,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub bot_name: String,
    pub reply_delay_ms: u64,
    /// Replaces the built-in keyword table when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<KeywordRule>>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bot_name: "DevBot".to_string(),
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            rules: None,
        }
    }
}

impl ChatConfig {
    pub fn responder(&self) -> KeywordResponder {
        match &self.rules {
            Some(rules) => KeywordResponder::new(rules.clone()),
            None => KeywordResponder::default(),
        }
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub submit_delay_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
        }
    }
}

impl ContactConfig {
    pub fn submitter(&self) -> ContactSubmitter {
        ContactSubmitter::new(Duration::from_millis(self.submit_delay_ms))
    }
}

impl Config {
    pub fn default_data_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("devbot")
    }

    /// Load `config.json` from the data directory, writing defaults when
    /// there is none yet.
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(Self::default_data_dir);

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!(path = %config_path.display(), "config file is empty, using defaults");
            } else {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %config_path.display(), error = %e, "failed to parse config.json, using defaults");
                    }
                }
            }

            // Leave a broken or empty file alone so it can be fixed by hand.
            return Ok(Self::default_config(data_dir));
        }

        let config = Self::default_config(data_dir);
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let json_str = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(self.config_file(), json_str)
            .context("Failed to write config.json")?;
        Ok(())
    }

    fn default_config(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            progress: ProgressTiming::default(),
            chat: ChatConfig::default(),
            voice: RecognitionRequest::default(),
            contact: ContactConfig::default(),
            projects: Vec::new(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::Category;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_written() {
        let dir = tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        assert!(config.config_file().exists());
        assert_eq!(config.progress, ProgressTiming::default());
        assert_eq!(config.chat.reply_delay(), Duration::from_millis(500));
        assert_eq!(config.contact.submit_delay_ms, 1800);
        assert_eq!(config.voice.lang, "en-US");
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{
                "progress": { "step_ms": 20 },
                "chat": {
                    "rules": [
                        { "category": "codingProfiles", "trigger_words": ["github"], "response": "github.com/dev" }
                    ]
                },
                "projects": [ { "title": "Snake", "url": "https://youtu.be/s" } ]
            }"#,
        )
        .unwrap();

        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(config.progress.step_ms, 20);
        assert_eq!(config.progress.duration_ms, 1400);
        assert_eq!(config.chat.bot_name, "DevBot");
        assert_eq!(config.projects.len(), 1);

        let responder = config.chat.responder();
        assert_eq!(responder.rules()[0].category, Category::CodingProfiles);
        assert_eq!(responder.respond("GitHub?"), "github.com/dev");
    }

    #[test]
    fn test_broken_file_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(config.chat.reply_delay_ms, 500);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_round_trip_through_save() {
        let dir = tempdir().unwrap();
        let mut config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        config.projects.push(Project {
            title: "Portfolio".to_string(),
            url: "https://www.youtube.com/watch?v=p".to_string(),
        });
        config.save().unwrap();

        let reloaded = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(reloaded.projects, config.projects);
        assert_eq!(reloaded.data_dir(), dir.path());
    }
}
