mod config;
mod error;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tsuiseki_api::{AniListClient, HttpTransport};

use config::Config;
use error::CliError;
use output::Output;

const VERBOSE_FILTER: &str = "tsuiseki=debug,tsuiseki_api=debug";

/// Look up anime and manga on AniList and track list progress.
#[derive(Debug, Parser)]
#[command(name = "tsuiseki", version)]
struct Cli {
    /// Config file to use instead of the per-user one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// AniList access token, overrides `anilist.access_token`.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find an anime by title, optionally refined by its first air date.
    Search {
        title: String,
        /// First episode air date (YYYY-MM-DD).
        #[arg(long)]
        aired: Option<NaiveDate>,
        /// Start from a season this many steps away from the aired one.
        #[arg(
            long,
            default_value_t = 0,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i32).range(-1..=1)
        )]
        offset: i32,
    },
    /// Fetch a media entry by AniList id.
    Lookup { id: u64 },
    /// List the users someone follows.
    Following { username: String },
    /// Show a user's anime or manga list.
    Updates {
        username: String,
        /// ANIME or MANGA.
        #[arg(long, default_value = "ANIME")]
        kind: String,
    },
    /// Show a user's progress on a media entry.
    Progress { username: String, media_id: u64 },
    /// Set progress and status on your own list entry.
    SetProgress {
        media_id: u64,
        progress: u32,
        /// AniList list status (CURRENT, PLANNING, COMPLETED, ...).
        #[arg(long, default_value = "CURRENT")]
        status: String,
    },
    /// Show who the access token belongs to.
    Whoami,
    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the config file location.
    Path,
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
    };

    // Already installed when several commands run in one process (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatch a parsed command line.
///
/// `config` subcommands run before any config file is read, so they work
/// on paths that do not exist yet or hold invalid TOML.
async fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Config { action } = &cli.command {
        init_logging(&Config::default().log.filter, cli.verbose);
        return run_config(cli.config.as_deref(), action, &Output::new(cli.json));
    }

    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.log.filter, cli.verbose);
    execute(cli, config).await
}

fn run_config(path: Option<&Path>, action: &ConfigAction, out: &Output) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(Config::config_path);
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save(&path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            out.done()
        }
    }
}

async fn execute(cli: Cli, config: Config) -> Result<(), CliError> {
    let out = Output::new(cli.json);

    let transport = HttpTransport::with_endpoint(&config.anilist.endpoint)?;
    let client = AniListClient::with_transport(transport)
        .strict_graphql_errors(config.anilist.strict_graphql_errors);

    let token = cli.token.or(config.anilist.access_token);
    let authenticated = token.map(|t| client.clone().authenticated(t));
    let reader: &AniListClient = authenticated.as_deref().unwrap_or(&client);

    match cli.command {
        Command::Search {
            title,
            aired,
            offset,
        } => {
            let item = reader.find_item_with_offset(&title, aired, offset).await?;
            out.item(item.as_ref())
        }
        Command::Lookup { id } => {
            let item = reader.get_item_by_id(id).await?;
            out.item(item.as_ref())
        }
        Command::Following { username } => {
            let names = reader.get_following_names(&username).await?;
            tracing::info!(username = %username, count = names.len(), "fetched following list");
            out.names(&names)
        }
        Command::Updates { username, kind } => {
            let updates = reader.get_updates(&username, &kind.to_uppercase()).await?;
            out.updates(&updates)
        }
        Command::Progress { username, media_id } => {
            let progress = reader.get_progress(&username, media_id).await?;
            out.progress(progress)
        }
        Command::SetProgress {
            media_id,
            progress,
            status,
        } => {
            let client = authenticated
                .as_ref()
                .ok_or(CliError::MissingToken("set-progress"))?;
            client.update_progress(media_id, progress, &status).await?;
            tracing::info!(media_id, progress, status = %status, "progress updated");
            out.done()
        }
        Command::Whoami => {
            let client = authenticated
                .as_ref()
                .ok_or(CliError::MissingToken("whoami"))?;
            let viewer = client.viewer().await?;
            out.viewer(viewer.as_ref())
        }
        Command::Config { action } => run_config(cli.config.as_deref(), &action, &out),
    }
}
