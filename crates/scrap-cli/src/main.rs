//! Scrap CLI - Main Entry Point

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use scrap_core::{
    Config, CreateOutcome, FileContent, FileStore, LocalScrapService, OverlapPolicy, ScrapError, ScrapId,
    ScrapService, ScrapSession, SimulatedRemoteService,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scrap-cli")]
#[command(about = "Highlight and keep passages of an HTML document", long_about = None)]
struct Cli {
    /// HTML document to work on
    document: PathBuf,

    /// Directory holding the saved scraps
    #[arg(long, env = "SCRAP_STORE", default_value = ".scrap")]
    store: PathBuf,

    /// Issue ids through the simulated remote service
    #[arg(long, env = "SCRAP_REMOTE")]
    remote: bool,

    /// Round-trip latency of the remote service in milliseconds
    #[arg(long, env = "SCRAP_LATENCY_MS", default_value_t = 100)]
    latency_ms: u64,

    /// Class of the element whose text is scrapped
    #[arg(long, env = "SCRAP_CONTENT_CLASS", default_value = "content")]
    content_class: String,

    /// Refuse scraps that overlap an existing one
    #[arg(long, env = "SCRAP_REJECT_OVERLAPS")]
    reject_overlaps: bool,

    /// Find scraps by their text when their offsets no longer fit
    #[arg(long, env = "SCRAP_CONTENT_FALLBACK")]
    content_fallback: bool,

    /// Start from the saved highlighted content when present
    #[arg(long, env = "SCRAP_RESTORE_SNAPSHOT")]
    restore_snapshot: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved scraps
    List,
    /// Scrap the text between two UTF-16 offsets
    Add { start: usize, end: usize },
    /// Scrap the first occurrence of a phrase
    Select { text: String },
    /// Remove a scrap
    Delete { id: String },
    /// Remove every scrap
    Clear,
    /// Print the highlighted content
    Render,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            content_class: self.content_class.clone(),
            overlap_policy: if self.reject_overlaps {
                OverlapPolicy::Reject
            } else {
                OverlapPolicy::Allow
            },
            content_fallback: self.content_fallback,
            restore_snapshot: self.restore_snapshot,
            remote_latency: Duration::from_millis(self.latency_ms),
            ..Config::default()
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    smol::block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    let storage = FileStore::open(&cli.store)
        .with_context(|| format!("failed to open scrap store at {}", cli.store.display()))?;
    let service: Box<dyn ScrapService> = if cli.remote {
        Box::new(SimulatedRemoteService::new(config.remote_latency))
    } else {
        Box::new(LocalScrapService::new())
    };

    let source = FileContent::new(&cli.document);
    let mut session = ScrapSession::open(&source, storage, service, config)
        .await
        .with_context(|| format!("failed to open {}", cli.document.display()))?;

    match cli.command {
        Commands::List => {
            for record in session.store().list() {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.id,
                    record.offset,
                    record.timestamp,
                    record.display_text()
                );
            }
        }
        Commands::Add { start, end } => {
            session.select_offsets(start, end)?;
            print_outcome(&session.create_from_selection().await?);
        }
        Commands::Select { text } => {
            if !session.select_text(&text) {
                bail!("{text:?} does not occur in the document");
            }
            print_outcome(&session.create_from_selection().await?);
        }
        Commands::Delete { id } => {
            if !session.delete(&ScrapId::new(id.as_str()))? {
                return Err(ScrapError::UnknownScrap(id).into());
            }
            println!("deleted {id}");
        }
        Commands::Clear => {
            session.clear_all()?;
            println!("cleared all scraps");
        }
        Commands::Render => {
            let report = session.render();
            for id in report.unresolved.iter().chain(&report.failed) {
                tracing::warn!(%id, "scrap not highlighted");
            }
            println!("{}", session.content_html());
        }
    }
    Ok(())
}

fn print_outcome(outcome: &CreateOutcome) {
    match outcome {
        CreateOutcome::Created(record) => {
            println!("scrapped {} {} {:?}", record.id, record.offset, record.content)
        }
        CreateOutcome::Duplicate => println!("already scrapped"),
        CreateOutcome::Overlap => println!("overlaps an existing scrap"),
        CreateOutcome::NoSelection => println!("nothing selected"),
        CreateOutcome::Ineligible => println!("selection is outside the scrappable content"),
    }
}
