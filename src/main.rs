//! Actlog CLI
//!
//! Command-line interface for activity log analytics:
//! - Load a directory of CSV log files into memory
//! - Count distinct users
//! - Rank the most frequent actions
//! - Count occurrences of one (user, action) pair

use actlog::config::{generate_default_config, Config, LoggingConfig};
use actlog::loader::{LoadReport, LogLoader};
use actlog::query::QueryEngine;
use actlog::store::{SnapshotStats, TimeRange};
use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "actlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory analytics for user activity logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing .csv log files (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the log and print snapshot statistics
    Stats,

    /// Count distinct users
    Users {
        /// Range start: epoch ms or RFC 3339
        #[arg(long, conflicts_with = "last")]
        since: Option<String>,
        /// Range end: epoch ms or RFC 3339
        #[arg(long, conflicts_with = "last")]
        until: Option<String>,
        /// Relative range ending now (e.g. 7d, 4w, 3m, 1y)
        #[arg(long)]
        last: Option<String>,
    },

    /// Rank the most frequent actions
    TopActions {
        /// How many actions to return
        #[arg(default_value = "10")]
        k: usize,
        /// Range start: epoch ms or RFC 3339
        #[arg(long, conflicts_with = "last")]
        since: Option<String>,
        /// Range end: epoch ms or RFC 3339
        #[arg(long, conflicts_with = "last")]
        until: Option<String>,
        /// Relative range ending now (e.g. 7d, 4w, 3m, 1y)
        #[arg(long)]
        last: Option<String>,
    },

    /// Count occurrences of one (user, action) pair
    Count {
        /// User identifier
        user: String,
        /// Action identifier (UUID)
        action: Uuid,
        /// Range start: epoch ms or RFC 3339
        #[arg(long, conflicts_with = "last")]
        since: Option<String>,
        /// Range end: epoch ms or RFC 3339
        #[arg(long, conflicts_with = "last")]
        until: Option<String>,
        /// Relative range ending now (e.g. 7d, 4w, 3m, 1y)
        #[arg(long)]
        last: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &content)?;
                println!("Config written to {:?}", path);
            }
            None => print!("{content}"),
        }
        return Ok(());
    }

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    let mut loader = LogLoader::new();
    if let Some(limit) = config.data.record_cap() {
        loader = loader.with_max_records(limit);
    }

    let (snapshot, report) = loader
        .load_dir(&data_dir)
        .with_context(|| format!("loading logs from {:?}", data_dir))?;

    let engine = QueryEngine::new(Arc::new(snapshot));
    let json = cli.format == "json";

    match cli.command {
        Commands::Stats => {
            print_stats(&engine.snapshot().stats(), &report, json);
        }

        Commands::Users { since, until, last } => {
            let range = parse_range(since, until, last)?;
            let count = engine.count_distinct_users(range);

            if json {
                println!("{}", serde_json::json!({ "distinct_users": count }));
            } else {
                println!("Distinct users: {count}");
            }
        }

        Commands::TopActions {
            k,
            since,
            until,
            last,
        } => {
            let range = parse_range(since, until, last)?;
            let entries = engine.top_k_action_counts(k, range);

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No actions in the selected time range");
            } else {
                println!("{:<36}  {}", "Action", "Count");
                println!("{}", "-".repeat(44));
                for entry in entries {
                    println!("{:<36}  {}", entry.action_id, entry.count);
                }
            }
        }

        Commands::Count {
            user,
            action,
            since,
            until,
            last,
        } => {
            let range = parse_range(since, until, last)?;
            let count = engine.count_user_action(&user, &action, range);

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "user_id": user,
                        "action_id": action,
                        "count": count,
                    })
                );
            } else {
                println!("{count}");
            }
        }

        // Handled before loading
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Initialize the tracing subscriber from the logging config
fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("actlog={}", config.level)),
    );

    if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn print_stats(stats: &SnapshotStats, report: &LoadReport, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "snapshot": stats, "load": report })
        );
        return;
    }

    println!("Activity log");
    println!("  Files:            {}", report.files);
    println!("  Records:          {}", stats.records);
    println!("  Distinct users:   {}", stats.distinct_users);
    println!("  Distinct actions: {}", stats.distinct_actions);
    if let Some((min, max)) = stats.time_bounds {
        println!(
            "  Time bounds:      {} .. {}",
            format_timestamp(min),
            format_timestamp(max)
        );
    }
    println!("  Estimated memory: {}", format_bytes(stats.estimated_bytes));
    println!("  Load time:        {} ms", report.elapsed_ms);
}

/// Resolve --since/--until/--last flags into a time range
fn parse_range(
    since: Option<String>,
    until: Option<String>,
    last: Option<String>,
) -> anyhow::Result<TimeRange> {
    if let Some(last) = last {
        let duration = parse_duration(&last)?;
        let end = Utc::now().timestamp_millis();
        return Ok(TimeRange::new(end - duration.num_milliseconds(), end));
    }

    let start = match since {
        Some(s) => parse_bound(&s)?,
        None => i64::MIN,
    };
    let end = match until {
        Some(s) => parse_bound(&s)?,
        None => i64::MAX,
    };

    Ok(TimeRange::new(start, end))
}

fn parse_bound(s: &str) -> anyhow::Result<i64> {
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    anyhow::bail!("invalid timestamp {:?}; use epoch milliseconds or RFC 3339", s)
}

fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim().to_lowercase();

    if let Some(days) = s.strip_suffix('d') {
        Ok(Duration::days(days.parse()?))
    } else if let Some(weeks) = s.strip_suffix('w') {
        Ok(Duration::weeks(weeks.parse()?))
    } else if let Some(months) = s.strip_suffix('m') {
        Ok(Duration::days(months.parse::<i64>()? * 30))
    } else if let Some(years) = s.strip_suffix('y') {
        Ok(Duration::days(years.parse::<i64>()? * 365))
    } else {
        anyhow::bail!("invalid duration {:?}; use formats like 7d, 4w, 3m, 1y", s)
    }
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
