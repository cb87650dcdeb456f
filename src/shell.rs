use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::config::Config;
use crate::core::chat::{ChatMessage, ChatSession, Sender};
use crate::core::voice::{LineRecognizer, RecognitionRequest, VoiceInput};

/// Interactive DevBot chat in the terminal
pub struct ChatShell {
    bot_name: String,
    session: ChatSession,
    voice_request: RecognitionRequest,
}

impl ChatShell {
    pub fn new(config: &Config) -> Self {
        let mut session = ChatSession::new(config.chat.responder(), config.chat.reply_delay());
        session.panel_mut().toggle(false);

        ChatShell {
            bot_name: config.chat.bot_name.clone(),
            session,
            voice_request: config.voice.clone(),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Read typed messages until EOF or an exit command.
    pub async fn run<Rd: AsyncBufRead + Unpin>(&mut self, mut reader: Rd) -> Result<()> {
        println!("{}", format!("💬 Chat with {}", self.bot_name).cyan().bold());
        println!("{}", "Type '/help' for commands, 'exit' to quit".dimmed());

        loop {
            print!("{}", "you> ".green().bold());
            io::stdout().flush()?;

            let mut bytes = Vec::new();
            let read = reader
                .read_until(b'\n', &mut bytes)
                .await
                .context("Failed to read chat input")?;
            if read == 0 {
                println!();
                break;
            }

            let Ok(input) = String::from_utf8(bytes) else {
                warn!("chat input is not valid UTF-8");
                println!("{}", "⚠️ Could not read that line, please type it again.".yellow());
                continue;
            };

            // "help" on its own is a question for the bot, not a shell command.
            match input.trim() {
                "" => continue,
                "/help" => self.show_help(),
                "/history" => self.show_history(),
                "exit" | "quit" | "/exit" | "/quit" | "/close" => break,
                message => {
                    if let Some(reply) = self.session.send_message(message).await {
                        self.print_reply(&reply);
                    }
                }
            }
        }

        self.close();
        Ok(())
    }

    /// Treat every line of `reader` as a spoken phrase.
    pub async fn run_voice<Rd: AsyncBufRead + Unpin>(&mut self, reader: Rd) -> Result<()> {
        println!("{}", format!("🎤 Talking to {} ({})", self.bot_name, self.voice_request.lang).cyan().bold());
        println!("{}", "Each line is one spoken phrase, end input to stop".dimmed());

        let mut voice = VoiceInput::new(LineRecognizer::new(reader), self.voice_request.clone());

        while voice.is_enabled() {
            match voice.send_to(&mut self.session).await {
                Ok(Some(reply)) => {
                    if let Some(heard) = self.session.log().messages().iter().rev().nth(1) {
                        println!("{} {}", "you (voice)>".green().bold(), heard.text);
                    }
                    self.print_reply(&reply);
                }
                Ok(None) => {}
                Err(e) if e.is_aborted() => break,
                Err(e) => {
                    if let Some(text) = e.alert_text() {
                        println!("{} {}", "⚠️".yellow(), text.yellow());
                    }
                }
            }
        }

        self.close();
        Ok(())
    }

    fn close(&mut self) {
        if self.session.panel().is_open() {
            self.session.panel_mut().toggle(false);
        }
        println!("{}", "Goodbye!".cyan());
    }

    fn print_reply(&self, reply: &ChatMessage) {
        println!("{} {}", format!("{}>", self.bot_name).blue().bold(), reply.text);
    }

    fn show_history(&self) {
        let log = self.session.log();
        if log.is_empty() {
            println!("{}", "No messages yet.".dimmed());
            return;
        }

        for message in log.messages() {
            let who = match message.sender {
                Sender::User => "you".green(),
                Sender::Bot => self.bot_name.as_str().blue(),
            };
            println!(
                "{} {}: {}",
                message.sent_at.format("%H:%M:%S").to_string().dimmed(),
                who,
                message.text
            );
        }
    }

    fn show_help(&self) {
        println!("\n{}", "Chat Commands".cyan().bold());
        println!("  {} - Show this help", "/help".green());
        println!("  {} - Show the conversation so far", "/history".green());
        println!("  {} - Close the chat", "exit, quit, /close".green());
        println!("  {} - Ask about skills, projects, coding profiles or contact info", "Any other input".green());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::FALLBACK_RESPONSE;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use tempfile::tempdir;
    use tokio::io::{AsyncRead, ReadBuf};

    /// Stdin that fails on every read.
    struct DeadInput;

    impl AsyncRead for DeadInput {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "input/output error")))
        }
    }

    impl AsyncBufRead for DeadInput {
        fn poll_fill_buf(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<io::Result<&[u8]>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "input/output error")))
        }

        fn consume(self: Pin<&mut Self>, _amt: usize) {}
    }

    fn shell() -> (tempfile::TempDir, ChatShell) {
        let dir = tempdir().unwrap();
        let mut config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        config.chat.reply_delay_ms = 0;
        (dir, ChatShell::new(&config))
    }

    #[tokio::test]
    async fn test_run_stops_at_exit_command() {
        let (_dir, mut shell) = shell();
        assert!(shell.session().panel().is_open());

        let input: &[u8] = b"hello\n\n/history\nzzz\nexit\nleetcode\n";
        shell.run(input).await.unwrap();

        let texts: Vec<&str> = shell.session().log().messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[0], "hello");
        assert_eq!(texts[2], "zzz");
        assert_eq!(texts[3], FALLBACK_RESPONSE);
        assert!(!shell.session().panel().is_open());
    }

    #[tokio::test]
    async fn test_run_voice_until_input_ends() {
        let (_dir, mut shell) = shell();

        let input: &[u8] = b"bye\n\nhow do I reach you\n";
        shell.run_voice(input).await.unwrap();

        let log = shell.session().log().messages();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0].text, "bye");
        assert_eq!(log[1].text, "Goodbye! Feel free to chat anytime.");
        assert!(log[3].text.starts_with("You can contact me"));
    }

    #[tokio::test]
    async fn test_plain_help_reaches_the_bot() {
        let (_dir, mut shell) = shell();

        let input: &[u8] = b"help\n/help\nexit\n";
        shell.run(input).await.unwrap();

        let log = shell.session().log().messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].text, "help");
        assert!(log[1].text.starts_with("I'm here to help!"));
    }

    #[tokio::test]
    async fn test_garbled_line_does_not_end_chat() {
        let (_dir, mut shell) = shell();

        let input: &[u8] = b"\xff\xfe\nhello\nexit\n";
        shell.run(input).await.unwrap();

        let log = shell.session().log().messages();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].text, "hello");
    }

    #[tokio::test]
    async fn test_run_voice_stops_when_input_fails() {
        let (_dir, mut shell) = shell();

        let finished = tokio::time::timeout(std::time::Duration::from_secs(2), shell.run_voice(DeadInput)).await;

        assert!(matches!(finished, Ok(Ok(()))), "voice loop kept retrying a dead input");
        assert!(shell.session().log().is_empty());
        assert!(!shell.session().panel().is_open());
    }
}
