use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use tracing::{info, warn};

use guest_signal::config::{Config, RuntimeConfig};
use guest_signal::{
    FeedbackAnalyzer, FeedbackInput, ReportWindow, StoredFeedback, aggregate, logging,
};

#[derive(Parser)]
#[command(name = "guest-signal")]
#[command(about = "Guest feedback sentiment, topics and flagging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze feedback JSON lines and write stored records as JSON lines
    Analyze {
        /// Input file, or - for stdin
        #[arg(long, default_value = "-")]
        input: String,
        /// Output file, or - for stdout
        #[arg(long, default_value = "-")]
        output: String,
    },
    /// Aggregate stored records into a report
    Report {
        #[arg(long)]
        input: String,
        /// Window start (RFC 3339); defaults to the configured trailing window
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Window end (RFC 3339); defaults to now
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },
    /// Load the configured backends and show which are available
    Backends,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(&RuntimeConfig::load_from_env());

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze { input, output } => run_analyze(&config, &input, &output).await,
        Commands::Report { input, from, to } => run_report(&config, &input, from, to),
        Commands::Backends => {
            let analyzer = FeedbackAnalyzer::initialize(&config).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&analyzer.backend_summary())?
            );
            Ok(())
        }
    }
}

async fn run_analyze(config: &Config, input: &str, output: &str) -> Result<()> {
    let inputs: Vec<FeedbackInput> = read_records(open_input(input)?, "feedback")
        .into_iter()
        .filter_map(|(line, record): (usize, FeedbackInput)| match record.normalized() {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping line {}: {}", line, e);
                None
            }
        })
        .collect();

    let analyzer = FeedbackAnalyzer::initialize(config).await;
    let results = analyzer.analyze_batch(&inputs).await;

    let mut out: Box<dyn Write> = if output == "-" {
        Box::new(std::io::stdout().lock())
    } else {
        let file =
            File::create(output).with_context(|| format!("Failed to create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    let now = Utc::now();
    let mut flagged = 0;
    for (feedback, result) in inputs.iter().zip(&results) {
        if result.flagged() {
            flagged += 1;
        }
        let row = StoredFeedback::from_analysis(feedback, result, now);
        serde_json::to_writer(&mut out, &row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(
        "Analyzed {} feedback items ({} flagged)",
        results.len(),
        flagged
    );
    Ok(())
}

fn run_report(
    config: &Config,
    input: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<()> {
    let records: Vec<StoredFeedback> = read_records(open_input(input)?, "stored feedback")
        .into_iter()
        .map(|(_, record)| record)
        .collect();

    let end = to.unwrap_or_else(Utc::now);
    let window = match from {
        Some(start) => ReportWindow::new(start, end)?,
        None => ReportWindow::trailing_days(config.analytics.window_days, end),
    };

    let report = aggregate(&records, &window);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Parse JSON lines, keeping the 1-based line number. Unreadable or invalid lines are
/// logged and skipped.
fn read_records<T: DeserializeOwned>(reader: impl BufRead, kind: &str) -> Vec<(usize, T)> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Skipping line {}: read failed: {}", line_no, e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push((line_no, record)),
            Err(e) => warn!("Skipping line {}: invalid {}: {}", line_no, kind, e),
        }
    }
    records
}
