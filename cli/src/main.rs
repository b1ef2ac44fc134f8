//! Command-line front end for the vigil folder monitor.

mod span;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use vigil_monitor::{Decision, EscalationConfig, MonitorController, MonitorNotice};

#[derive(Parser)]
#[command(
    name = "vigil",
    about = "Watch folders and require an operator acknowledgment for every change"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch directories; every create/delete/rename must be acknowledged.
    Watch {
        /// Directories to watch (non-recursive).
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Seconds before a pending change counts as unanswered.
        #[arg(long, default_value_t = 120)]
        unanswered_after: u64,

        /// Emit notices as JSON lines instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print how many days have passed since a date (YYYY-MM-DD).
    Since {
        /// The earlier date.
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match Cli::parse().command {
        Command::Watch {
            paths,
            unanswered_after,
            json,
        } => watch(paths, unanswered_after, json).await,
        Command::Since { date } => {
            since(date);
            Ok(())
        }
    }
}

/// Run the monitor, rendering notices and feeding operator decisions
/// from stdin: `continue`/`c`, `stop`/`s`, and `focus`/`f` to flag the
/// pending change.
async fn watch(paths: Vec<PathBuf>, unanswered_after: u64, json: bool) -> Result<()> {
    let config = EscalationConfig::default()
        .with_unanswered_after(Duration::from_secs(unanswered_after));
    let (monitor, mut notices) = MonitorController::new(config);

    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            render(&notice, json);
        }
    });

    let decider = monitor.acknowledger();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let decision = match line.trim().to_lowercase().as_str() {
                "c" | "continue" => Some(Decision::Continue),
                "s" | "stop" => Some(Decision::Stop),
                "f" | "focus" => {
                    decider.attention_returned().await;
                    None
                }
                "" => None,
                other => {
                    eprintln!("unknown input {other:?}, expected continue/stop/focus");
                    None
                }
            };

            if let Some(decision) = decision {
                if let Err(err) = decider.decide(decision).await {
                    eprintln!("{err}");
                }
            }
        }
    });

    if !json {
        println!("answer each change with continue (c) or stop (s); focus (f) flags the pending one");
    }
    monitor.run(paths).await?;
    Ok(())
}

fn render(notice: &MonitorNotice, json: bool) {
    if json {
        match serde_json::to_string(notice) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!("failed to encode notice: {err}"),
        }
        return;
    }

    match notice {
        MonitorNotice::SessionOpened { event, message, .. } => {
            println!("{}", message.bold());
            println!("  path: {}", event.path.display());
            println!("  detected: {}", event.detected_at);
            println!("  keep monitoring? continue/stop");
        }
        MonitorNotice::Elapsed { elapsed, overdue } => {
            let line = format!("pending for {}s", elapsed.as_secs());
            if *overdue {
                println!("{}", line.red());
            } else {
                println!("{line}");
            }
        }
        MonitorNotice::Escalation { event, elapsed } => {
            let line = format!(
                "attention: {} still awaits a decision ({}s)",
                event.name,
                elapsed.as_secs()
            );
            println!("{}", line.yellow().bold());
        }
        MonitorNotice::SessionClosed { decision } => {
            println!("acknowledged: {decision:?}");
        }
        MonitorNotice::WatchDegraded { path, detail } => {
            eprintln!("watch lost on {}: {detail}", path.display());
        }
    }
}

fn since(date: NaiveDate) {
    let today = Utc::now().date_naive();
    let days = span::days_since(date);

    println!("Today is: {today}");
    println!("Opened on: {date}");
    println!("{}", format!("The span is: {days} days").green());
}
