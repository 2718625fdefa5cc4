mod render;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use zapdisc_core::AppConfig;
use zapdisc_discovery::{AuthorSummary, Discovery, RunStatistics};
use zapdisc_relay::RelayPool;

#[derive(Debug, Parser)]
#[command(name = "zapdisc")]
#[command(about = "Discover active Nostr users worth zapping")]
struct Cli {
    /// Relay to query instead of the configured set (repeatable)
    #[arg(long = "relay", global = true)]
    relays: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sample recently active authors and print one card per author
    Discover {
        /// Emit summaries and statistics as JSON
        #[arg(long)]
        json: bool,

        /// Leave bot accounts out of the printed cards
        #[arg(long)]
        hide_bots: bool,
    },
    /// Show an author's profile and recent notes
    Notes {
        /// Hex public key of the author
        pubkey: String,

        /// Maximum number of notes to show
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// JSON shape for `discover --json`.
#[derive(Debug, Serialize)]
struct DiscoverReport<'a> {
    stats: Option<&'a RunStatistics>,
    summaries: Vec<&'a AuthorSummary>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = zapdisc_core::load_app_config()?;
    init_tracing(&config.log_level);

    if !cli.relays.is_empty() {
        config.relays = cli.relays;
    }
    tracing::debug!(env = %config.env, relays = ?config.relays, "configuration loaded");

    match cli.command {
        Commands::Discover { json, hide_bots } => run_discover(&config, json, hide_bots).await,
        Commands::Notes { pubkey, limit } => run_notes(&config, &pubkey, limit).await,
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_discovery(config: &AppConfig) -> anyhow::Result<Discovery<RelayPool>> {
    Discovery::from_config(config).map_err(|e| anyhow::anyhow!("invalid relay configuration: {e}"))
}

/// Run one discovery and print the result.
///
/// # Errors
///
/// Returns an error if the relay set is unusable or the run fails.
async fn run_discover(config: &AppConfig, json: bool, hide_bots: bool) -> anyhow::Result<()> {
    let mut discovery = build_discovery(config)?;
    let state = discovery.fetch_random_users().await?;

    let shown: Vec<&AuthorSummary> = state
        .summaries
        .iter()
        .filter(|s| !(hide_bots && s.is_bot))
        .collect();

    if json {
        let report = DiscoverReport {
            stats: state.stats.as_ref(),
            summaries: shown,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(stats) = &state.stats {
        println!("{}", render::render_stats(stats));
    }

    if shown.is_empty() {
        println!("no active users found in the lookback window; try again later");
        return Ok(());
    }

    let now = Utc::now();
    for summary in shown {
        println!();
        println!("{}", render::render_card(summary, now));
    }

    Ok(())
}

/// Print one author's profile header followed by their recent notes.
///
/// # Errors
///
/// Returns an error if the relay set is unusable or either lookup fails.
async fn run_notes(config: &AppConfig, pubkey: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let discovery = build_discovery(config)?.with_note_feed(
        limit.unwrap_or(config.note_feed_limit),
        config.note_feed_timeout(),
    );

    let profile = discovery.author_profile(pubkey).await?;
    let notes = discovery.author_notes(pubkey).await?;

    println!("{}", render::render_profile_header(pubkey, profile.as_ref()));

    if notes.is_empty() {
        println!("no notes found for this author");
        return Ok(());
    }

    let now = Utc::now();
    for note in &notes {
        println!();
        println!("{}", render::render_note(note, now));
    }

    Ok(())
}
