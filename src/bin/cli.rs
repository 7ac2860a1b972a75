//! tender-watch CLI
//!
//! Runs the tracker loop or answers one-shot queries against the listing page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tender_watch::{
    artifacts::{Artifact, ArtifactExporter, CalendarExporter, SummaryExporter},
    error::{AppError, Result},
    models::{Config, RecipientId},
    pipeline::{Scheduler, Tracker},
    services::{HttpFetcher, LogSink, NotificationSink, TelegramSink},
    utils::http,
};

/// tender-watch - Procurement listing tracker
#[derive(Parser, Debug)]
#[command(
    name = "tender-watch",
    version,
    about = "Watches a procurement listing and alerts subscribers about new notices"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the listing on a fixed interval and notify subscribers
    Run {
        /// Recipient to subscribe at startup (repeatable)
        #[arg(short, long = "subscriber")]
        subscribers: Vec<String>,

        /// Log notifications instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the currently active publications
    List,

    /// Print one publication
    Show { id: String },

    /// Write a calendar file for a publication
    Calendar {
        id: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Write a PDF summary for a publication
    Summary {
        id: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Download the original document of a publication
    Download {
        id: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Pick the Telegram sink when a token is configured.
fn build_sink(
    config: &Config,
    client: reqwest::Client,
    dry_run: bool,
) -> Arc<dyn NotificationSink> {
    if dry_run {
        log::info!("Dry run: notifications will be logged");
        return Arc::new(LogSink);
    }
    match TelegramSink::from_env(client, &config.delivery.telegram_api_base) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            log::warn!("{e}. Notifications will be logged instead.");
            Arc::new(LogSink)
        }
    }
}

async fn save(artifact: Artifact, output: &Path) -> Result<()> {
    let path = artifact.write_to(output).await?;
    log::info!("Saved {}", path.display());
    Ok(())
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(id.to_string())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Validate = cli.command {
        log::info!("Validating {}...", cli.config.display());
        if let Err(e) = Config::load(&cli.config).and_then(|config| config.validate()) {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let client = http::create_async_client(&config.http)?;
    let fetcher = Arc::new(HttpFetcher::with_client(client.clone(), &config.source.url));
    // One-shot commands never notify
    let sink: Arc<dyn NotificationSink> = match cli.command {
        Command::Run { dry_run, .. } => build_sink(&config, client, dry_run),
        _ => Arc::new(LogSink),
    };
    let tracker = Arc::new(Tracker::new(&config, fetcher, sink)?);

    match cli.command {
        Command::Run { subscribers, .. } => {
            for id in subscribers {
                tracker.subscribe(RecipientId::new(id));
            }
            if tracker.subscribers().is_empty() {
                log::warn!("No subscribers registered; cycles will only refresh the index");
            }

            let scheduler = Scheduler::new(Arc::clone(&tracker), &config.scheduler);
            scheduler
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::error!("Failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                })
                .await;
        }

        Command::List => {
            tracker.refresh().await?;
            let alerts = tracker.list_active(tracker.now());
            if alerts.is_empty() {
                println!("No hay elementos vigentes en este momento.");
            }
            for alert in alerts {
                println!("{}", alert.text);
            }
        }

        Command::Show { id } => {
            tracker.refresh().await?;
            let alert = tracker.alert(&id, tracker.now()).ok_or_else(|| not_found(&id))?;
            println!("{}", alert.text);
            let actions: Vec<String> = alert.actions.iter().map(|a| a.callback_data()).collect();
            println!("Acciones: {}", actions.join(", "));
        }

        Command::Calendar { id, output } => {
            tracker.refresh().await?;
            let exporter = CalendarExporter::new(&config.source.url);
            export(&tracker, &id, &exporter, &output).await?;
        }

        Command::Summary { id, output } => {
            tracker.refresh().await?;
            export(&tracker, &id, &SummaryExporter, &output).await?;
        }

        Command::Download { id, output } => {
            tracker.refresh().await?;
            let artifact = tracker
                .download_document(&id)
                .await?
                .ok_or_else(|| not_found(&id))?;
            save(artifact, &output).await?;
        }

        // Handled before the tracker is built
        Command::Validate => {}
    }

    Ok(())
}

async fn export(
    tracker: &Tracker,
    id: &str,
    exporter: &dyn ArtifactExporter,
    output: &Path,
) -> Result<()> {
    let artifact = tracker.export(id, exporter)?.ok_or_else(|| not_found(id))?;
    save(artifact, output).await
}
