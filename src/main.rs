use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use devbot::cli;

#[derive(Parser)]
#[command(name = "devbot")]
#[command(about = "Portfolio behaviors in the terminal: progress circles, project videos, DevBot chat and the contact form")]
#[command(version)]
struct Args {
    /// Directory holding config.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate progress circles for the given percentages
    Progress {
        /// Raw percent values, read like a data-percent attribute
        #[arg(required = true, allow_hyphen_values = true)]
        percents: Vec<String>,
    },
    /// Chat with DevBot, once or interactively
    Chat {
        /// Message to send; omit for an interactive session
        message: Option<String>,
        /// Read each input line as a voice transcript
        #[arg(long)]
        voice: bool,
    },
    /// Convert a YouTube link to its embed URL
    Embed { url: String },
    /// List configured projects and their players
    Projects,
    /// Validate and send the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Show the effective configuration
    Config,
}

async fn run(args: Args) -> Result<()> {
    let data_dir = args.data_dir;

    match args.command {
        Commands::Progress { percents } => cli::handle_progress(percents, data_dir).await,
        Commands::Chat { message, voice } => cli::handle_chat(message, voice, data_dir).await,
        Commands::Embed { url } => cli::handle_embed(url).await,
        Commands::Projects => cli::handle_projects(data_dir).await,
        Commands::Contact { name, email, message } => {
            cli::handle_contact(name, email, message, data_dir).await
        }
        Commands::Config => cli::handle_config(data_dir).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
