use anyhow::{anyhow, Context, Result};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::BufReader;

use crate::config::Config;
use crate::core::chat::ChatSession;
use crate::core::contact::{ContactForm, SubmitError, SubmitState};
use crate::core::error::PortfolioError;
use crate::core::progress::{animate_all, ProgressAnimator, ProgressFrame};
use crate::core::video::{self, ProjectCard, VideoModal};
use crate::shell::ChatShell;

const BAR_WIDTH: usize = 20;

/// Wrap a library error so `main` prints the visitor-facing alert text.
fn alert(err: impl Into<PortfolioError>) -> anyhow::Error {
    let err: PortfolioError = err.into();
    anyhow!(err.alert_text())
}

/// Redraw every indicator's bar on the current terminal line.
fn draw_progress_line<W: Write>(out: &mut W, latest: &[Option<ProgressFrame>]) -> io::Result<()> {
    let line = latest
        .iter()
        .map(|f| f.as_ref().map(|f| f.bar(BAR_WIDTH)).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("  ");
    write!(out, "\r{}", line)?;
    out.flush()
}

pub async fn handle_progress(percents: Vec<String>, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let timing = config.progress;

    let animators: Vec<ProgressAnimator> = percents
        .iter()
        .map(|raw| ProgressAnimator::for_attribute(Some(raw.as_str()), &timing))
        .collect();

    let mut latest: Vec<Option<ProgressFrame>> = vec![None; animators.len()];
    let mut flush_error: Option<io::Error> = None;
    let finals = animate_all(animators, |index, frame| {
        latest[index] = Some(frame.clone());
        if let Err(e) = draw_progress_line(&mut io::stdout(), &latest) {
            flush_error.get_or_insert(e);
        }
    })
    .await;
    println!();

    if let Some(e) = flush_error {
        return Err(e).context("Failed to write progress output");
    }

    for (raw, frame) in percents.iter().zip(&finals) {
        println!(
            "{} {} → {}  stroke-dasharray: {}",
            "◯".cyan(),
            raw.dimmed(),
            frame.label().green().bold(),
            frame.dash_array()
        );
    }

    Ok(())
}

pub async fn handle_chat(message: Option<String>, voice: bool, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;

    if let Some(message) = message {
        let mut session = ChatSession::new(config.chat.responder(), config.chat.reply_delay());
        println!("{}: {}", "You".cyan(), message.trim());
        match session.send_message(&message).await {
            Some(reply) => println!("{}: {}", config.chat.bot_name.as_str().green(), reply.text),
            None => println!("{}", "Nothing to send.".dimmed()),
        }
        return Ok(());
    }

    let mut shell = ChatShell::new(&config);
    let stdin = BufReader::new(tokio::io::stdin());
    if voice {
        shell.run_voice(stdin).await
    } else {
        shell.run(stdin).await
    }
}

pub async fn handle_embed(url: String) -> Result<()> {
    let embed = video::to_embed_url(&url).map_err(alert)?;
    let player = video::player_url(&url).map_err(alert)?;

    println!("{}: {}", "Embed".cyan(), embed);
    println!("{}: {}", "Player".cyan(), player);
    Ok(())
}

pub async fn handle_projects(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;

    if config.projects.is_empty() {
        println!("No projects configured.");
        println!("Add them to {}", config.config_file().display());
        return Ok(());
    }

    println!("🎬 Projects ({}):", config.projects.len());
    let mut modal = VideoModal::default();
    for project in &config.projects {
        let mut card = ProjectCard::from(project);
        card.on_focus();
        let caption = card.overlay_text().unwrap_or_default();
        match modal.open(&card) {
            Ok(Some(src)) => println!("  {} {} - {}", card.title.bold(), caption.dimmed(), src),
            Ok(None) => println!("  {} - {}", card.title.bold(), "no link".dimmed()),
            Err(e) => println!("  {} - {}", card.title.bold(), e.alert_text().red()),
        }
        modal.close();
    }

    Ok(())
}

pub async fn handle_contact(
    name: String,
    email: String,
    message: String,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = Config::new(data_dir)?;
    let submitter = config.contact.submitter();
    let mut form = ContactForm::new(name, email, message);

    // Validate up front so the button never shows "Sending..." for a bad form.
    if let Err(e) = form.validate() {
        println!("{} {}", "✗".red(), e.field.name().red().bold());
        return Err(alert(e));
    }

    println!("{}", format!("[{}]", SubmitState::Sending.label()).dimmed());
    match submitter.submit(&mut form).await {
        Ok(receipt) => {
            println!("{} {}", "✓".green(), receipt.notice);
            println!("{}", format!("[{}]", submitter.state().label()).dimmed());
            Ok(())
        }
        Err(SubmitError::Invalid(e)) => Err(alert(e)),
        Err(e) => Err(e).context("Contact form was not sent"),
    }
}

pub async fn handle_config(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;

    println!("{}: {}", "Config".cyan(), config.config_file().display());
    println!("{}", json);
    Ok(())
}
