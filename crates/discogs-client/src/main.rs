//! Discogs client - command-line entry point
//!
//! Credentials come from the environment (or a `.env` file); see `Config::from_env`.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use discogs_client::{
    AuthConfig, DiscogsClient,
    auth::ReceiverConfig,
    config::Config,
};

#[derive(Parser, Debug)]
#[command(name = "discogs-client")]
#[command(about = "Query the Discogs API and obtain OAuth credentials")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Port for the OAuth redirect receiver
    #[arg(long, env = "DISCOGS_CALLBACK_PORT", global = true)]
    callback_port: Option<u32>,

    /// Print the authorization URL without opening a browser
    #[arg(long, global = true)]
    no_browser: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the OAuth handshake and print the credential snapshot
    Login,
    /// Show the account the credentials belong to
    Identity,
    /// Fetch a release by ID
    Release {
        /// Release ID
        id: u64,
    },
    /// Search the database
    Search {
        /// Search query
        query: String,

        /// Restrict to release, master, artist or label
        #[arg(long = "type")]
        kind: Option<String>,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Results per page
        #[arg(long, default_value = "10")]
        per_page: u32,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries command output
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply receiver and browser flags to an OAuth configuration.
fn apply_oauth_flags(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let AuthConfig::OAuth(settings) = &mut config.auth {
        if let Some(port) = cli.callback_port {
            settings.receiver = ReceiverConfig::new(port)?;
        }
        settings.open_browser = !cli.no_browser;
    }
    Ok(())
}

/// `login` only makes sense for an OAuth consumer; other schemes have nothing to obtain.
fn ensure_oauth(config: &Config) -> anyhow::Result<()> {
    match config.auth {
        AuthConfig::OAuth(_) => Ok(()),
        _ => anyhow::bail!(
            "login needs DISCOGS_KEY and DISCOGS_SECRET with DISCOGS_OAUTH=1 (configured: {})",
            config.auth.scheme()
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    apply_oauth_flags(&mut config, &cli)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        scheme = config.auth.scheme(),
        "Starting Discogs client"
    );

    if matches!(cli.command, Command::Login) {
        ensure_oauth(&config)?;
    }

    let client = DiscogsClient::new(config)?;

    match cli.command {
        Command::Login => {
            let credential = client.credential().await?;
            println!("{}", credential.to_snapshot()?);
        }
        Command::Identity => print_json(&client.get_identity().await?)?,
        Command::Release { id } => print_json(&client.get_release(id).await?)?,
        Command::Search { query, kind, page, per_page } => {
            print_json(&client.search(&query, kind.as_deref(), page, per_page).await?)?;
        }
    }

    Ok(())
}
