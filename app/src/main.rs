// In app/src/main.rs

use anyhow::{Context, Result};
use app_config::Settings;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use core_types::{Clock, ManualClock, OscillatorReading, Side, SystemClock};
use engine::{FEED_QUEUE_CAPACITY, FeedEvent, SessionSummary, TradingTask};
use execution::SimulatedHost;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use strategies::factory::config_from_preset;
use strategies::macd_divergence::decide;
use strategies::types::macd_divergence_descriptor;
use strategies::{EntryTimestamps, Exposure};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::prelude::*;

mod feed;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A MACD divergence trading bot.")]
struct Cli {
    /// Directory holding `base.toml` and the per-environment overrides.
    #[arg(long, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs a paper session, reading JSON-lines indicator updates from a file or stdin.
    Run {
        /// Feed file. Reads stdin when omitted.
        #[arg(short, long)]
        feed: Option<PathBuf>,

        /// Replay time between feed lines that carry no `at` timestamp.
        #[arg(long, default_value_t = 60)]
        step_seconds: i64,
    },

    /// Evaluates a single cycle offline and prints the decision.
    Decide {
        #[arg(long, allow_hyphen_values = true)]
        oscillator: f64,

        #[arg(long, allow_hyphen_values = true)]
        signal: f64,

        /// Number of open long positions.
        #[arg(long, default_value_t = 0)]
        longs: usize,

        /// Number of open short positions.
        #[arg(long, default_value_t = 0)]
        shorts: usize,

        /// Minutes since the open positions were entered.
        #[arg(long, default_value_t = 0)]
        held_minutes: i64,
    },

    /// Prints the strategy descriptor and its parameter bounds.
    Describe,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { feed, step_seconds } => {
            let settings = load_settings(&cli.config_dir)?;
            handle_run(settings, feed, Duration::seconds(step_seconds)).await?
        }
        Commands::Decide {
            oscillator,
            signal,
            longs,
            shorts,
            held_minutes,
        } => {
            let settings = load_settings(&cli.config_dir)?;
            handle_decide(&settings, oscillator, signal, longs, shorts, held_minutes)?
        }
        Commands::Describe => {
            println!("{}", serde_json::to_string_pretty(&macd_divergence_descriptor())?);
        }
    }

    Ok(())
}

fn load_settings(config_dir: &str) -> Result<Settings> {
    let settings = app_config::load_settings_from(config_dir)
        .with_context(|| format!("Failed to load settings from {config_dir}"))?;
    init_tracing(&settings.app.log_level);

    tracing::info!(environment = %settings.app.environment, symbol = %settings.strategy.symbol, "Starting MACD bot");
    Ok(settings)
}

/// Logs go to stderr so stdout stays clean for the JSON output.
fn init_tracing(log_level: &str) {
    let level = tracing::Level::from_str(log_level).unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- "Run" Subcommand Logic ---

/// Replays a feed against the paper venue until it ends or Ctrl-C arrives, then stops the
/// bot (liquidating any open position) and prints the session summary.
///
/// The bot runs on a replay clock that follows the feed, so hold times are measured in feed
/// time rather than in how fast the file is read.
async fn handle_run(settings: Settings, feed: Option<PathBuf>, step: Duration) -> Result<()> {
    if step <= Duration::zero() {
        anyhow::bail!("--step-seconds must be positive");
    }
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &feed {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open feed {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let replay_clock = Arc::new(ManualClock::new(Utc::now()));
    let clock: Arc<dyn Clock> = replay_clock.clone();
    let mut host = SimulatedHost::new(settings.simulation);
    let bot = engine::create_bot(&settings.strategy, &mut host, clock)?;

    let task = TradingTask::new(bot, host, FEED_QUEUE_CAPACITY);
    let cursor = feed::ReplayCursor::new(replay_clock.now(), step);
    let summary = run_session(reader, task, replay_clock, cursor).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Pumps the feed into the task until it ends, fails, Ctrl-C arrives or the task goes
/// away. Every one of those exits runs the stop hook before the summary is returned.
async fn run_session(
    reader: impl AsyncBufRead + Unpin,
    (task, tx): (TradingTask<SimulatedHost>, mpsc::Sender<FeedEvent>),
    replay_clock: Arc<ManualClock>,
    mut cursor: feed::ReplayCursor,
) -> Result<SessionSummary> {
    let handle = tokio::spawn(task.replaying(replay_clock).run());
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read the feed; stopping.");
                        break;
                    }
                };
                line_number += 1;
                if !replay_line(&tx, &mut cursor, &line, line_number).await {
                    tracing::error!("Trading task has terminated unexpectedly.");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; stopping.");
                break;
            }
        }
    }

    // The task may already be gone; the summary below tells us either way.
    let _ = tx.send(FeedEvent::Stop).await;
    drop(tx);

    let (summary, _host) = handle.await.context("Trading task panicked")?;
    Ok(summary)
}

/// Forwards one feed line to the task, preceded by its replay time. Malformed lines are
/// logged and skipped. Returns false once the task has stopped listening.
async fn replay_line(
    tx: &mpsc::Sender<FeedEvent>,
    cursor: &mut feed::ReplayCursor,
    line: &str,
    line_number: usize,
) -> bool {
    let parsed = match feed::parse_line(line) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return true,
        Err(e) => {
            tracing::warn!(line = line_number, error = %e, "Skipping feed line.");
            return true;
        }
    };
    let at = match cursor.next(parsed.at) {
        Ok(at) => at,
        Err(e) => {
            tracing::warn!(line = line_number, error = %e, "Skipping feed line.");
            return true;
        }
    };

    tx.send(FeedEvent::ClockAt(at)).await.is_ok()
        && tx.send(FeedEvent::Reading(parsed.reading)).await.is_ok()
}

// --- "Decide" Subcommand Logic ---

fn handle_decide(
    settings: &Settings,
    oscillator: f64,
    signal: f64,
    longs: usize,
    shorts: usize,
    held_minutes: i64,
) -> Result<()> {
    let config = config_from_preset(&settings.strategy)?;
    let now = SystemClock.now();
    let entered = now - Duration::minutes(held_minutes);

    let exposure = Exposure::new(longs, shorts);
    let mut entries = EntryTimestamps::default();
    for side in [Side::Long, Side::Short] {
        if exposure.has(side) {
            entries.record(side, entered);
        }
    }

    let reading = OscillatorReading::new(oscillator, signal);
    let decision = decide(exposure, Some(reading), &entries, now, config.min_hold);

    let output = serde_json::json!({
        "exposure": exposure,
        "state": exposure.state(),
        "reading": reading,
        "min_hold_minutes": config.min_hold.num_minutes(),
        "held_minutes": held_minutes,
        "decision": decision,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::OrderSide::{Buy, Sell};
    use core_types::{StrategyPreset, Symbol};
    use execution::SimulationSettings;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

    /// A reader whose disk went away.
    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("device unplugged")))
        }
    }

    type PaperTask = (TradingTask<SimulatedHost>, mpsc::Sender<FeedEvent>);

    fn paper_task(start: chrono::DateTime<Utc>) -> (PaperTask, Arc<ManualClock>) {
        let replay_clock = Arc::new(ManualClock::new(start));
        let mut host = SimulatedHost::new(SimulationSettings::default());
        let preset = StrategyPreset::new(Symbol("EURUSD".to_string()), toml::Value::Table(Default::default()));
        let bot = engine::create_bot(&preset, &mut host, replay_clock.clone()).unwrap();
        (TradingTask::new(bot, host, FEED_QUEUE_CAPACITY), replay_clock)
    }

    #[tokio::test]
    async fn read_error_still_liquidates_and_reports() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let (task, replay_clock) = paper_task(start);
        let first_line: &[u8] = b"{\"oscillator\": 0.5, \"signal\": -0.2}\n";
        let reader = BufReader::new(first_line.chain(BrokenReader));
        let cursor = feed::ReplayCursor::new(start, Duration::minutes(1));

        let summary = run_session(reader, task, replay_clock, cursor).await.unwrap();

        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.orders_accepted, 1);
        assert_eq!(summary.positions_after_stop, 0);
    }

    #[tokio::test]
    async fn demo_feed_closes_both_sides_after_the_hold() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let ((task, tx), replay_clock) = paper_task(start);
        let handle = tokio::spawn(task.replaying(replay_clock).run());

        let mut cursor = feed::ReplayCursor::new(start, Duration::minutes(1));
        for (index, line) in include_str!("../../demos/feed.jsonl").lines().enumerate() {
            assert!(replay_line(&tx, &mut cursor, line, index + 1).await);
        }
        tx.send(FeedEvent::Stop).await.unwrap();

        let (summary, host) = handle.await.unwrap();
        assert_eq!(summary.orders_accepted, 4);
        let sides: Vec<_> = host.orders().iter().map(|record| record.order.side).collect();
        assert_eq!(sides, vec![Buy, Sell, Sell, Buy]);
        assert_eq!(
            summary.status_messages,
            vec![
                "Opened long position.",
                "Waiting for a trading signal...",
                "Opened short position.",
                "Waiting for a trading signal...",
            ]
        );
        assert_eq!(summary.positions_after_stop, 0);
    }
}
