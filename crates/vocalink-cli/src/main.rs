use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "vocalink")]
#[command(about = "Vocalink CLI - talk to the chat assistant, the voice engine and Discord", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default config.toml and a secret.json template
    Init,
    /// List the speakers offered by the voice engine
    Speakers,
    /// Synthesize text to a WAV file
    Say {
        /// Style id passed to the engine as `speaker`
        #[arg(short, long)]
        speaker: String,
        /// Output file
        #[arg(short, long, default_value = "out.wav")]
        output: PathBuf,
        text: String,
    },
    /// Send one prompt to the chat assistant
    Chat {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Discord operations
    Discord {
        #[command(subcommand)]
        action: DiscordAction,
    },
}

#[derive(Subcommand)]
enum DiscordAction {
    /// Log the bot in and print its identity
    Whoami,
    /// Log the bot in and list its guilds
    Guilds,
    /// Log the bot in and list the members of a guild
    Members { guild_id: String },
    /// List guilds for a token without opening a gateway session
    UserGuilds {
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling in-flight requests");
            ctrl_c.cancel();
        }
    });

    let paths = vocalink_infrastructure::VocalinkPaths::new(cli.config_dir.as_deref());

    match cli.command {
        Commands::Init => commands::init::run(&paths)?,
        Commands::Speakers => {
            let ctx = context::CliContext::load(&paths).await?;
            commands::voice::speakers(&ctx, &cancel).await?
        }
        Commands::Say {
            speaker,
            output,
            text,
        } => {
            let ctx = context::CliContext::load(&paths).await?;
            commands::voice::say(&ctx, &text, &speaker, &output, &cancel).await?
        }
        Commands::Chat { prompt } => {
            let ctx = context::CliContext::load(&paths).await?;
            commands::chat::run(&ctx, &prompt.join(" "), &cancel).await?
        }
        Commands::Discord { action } => {
            let ctx = context::CliContext::load(&paths).await?;
            match action {
                DiscordAction::Whoami => commands::discord::whoami(&ctx, &cancel).await?,
                DiscordAction::Guilds => commands::discord::guilds(&ctx, &cancel).await?,
                DiscordAction::Members { guild_id } => {
                    commands::discord::members(&ctx, &guild_id, &cancel).await?
                }
                DiscordAction::UserGuilds { token } => {
                    commands::discord::user_guilds(&ctx, token.as_deref(), &cancel).await?
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vocalink={default_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
