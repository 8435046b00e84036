use std::process::ExitCode;

use clap::Args;
use driftsync_runtime::history::{HistoryStore, SyncEvent};
use log::{error, info};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Number of entries to display
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Clear all history
    #[arg(long)]
    pub clear: bool,
}

pub fn run(args: HistoryArgs) -> ExitCode {
    let store = match HistoryStore::new() {
        Some(s) => s,
        None => {
            info!("[history] history is currently disabled");
            return ExitCode::from(0);
        }
    };

    if args.clear {
        match store.clear() {
            Ok(_) => {
                println!("History cleared");
                return ExitCode::from(0);
            }
            Err(e) => {
                error!("[history] failed to clear history: {}", e);
                return ExitCode::from(1);
            }
        }
    }

    let syncs = store.recent_syncs(args.limit);

    if syncs.is_empty() {
        println!("No sync runs yet.");
        return ExitCode::from(0);
    }

    println!(
        "{:<20}  {:>4}  {:>4}  {:>8}  {:<10}  FOLDER",
        "TIMESTAMP", "UP", "DOWN", "TIME", "RESULT"
    );
    println!("{}", "-".repeat(80));

    for sync in syncs {
        let ts = sync.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();

        println!(
            "{:<20}  {:>4}  {:>4}  {:>6}ms  {:<10}  {}",
            ts,
            sync.uploaded,
            sync.downloaded,
            sync.duration_ms,
            outcome(&sync),
            sync.folder
        );
        if let Some(err) = &sync.error {
            println!("{:<20}  {err}", "");
        }
    }

    let total = store.count();
    if total > args.limit {
        println!(
            "\n({} more entries, use --limit to show more)",
            total - args.limit
        );
    }

    ExitCode::from(0)
}

fn outcome(sync: &SyncEvent) -> String {
    if sync.error.is_some() {
        "error".to_owned()
    } else if sync.cancelled {
        "cancelled".to_owned()
    } else if !sync.failed.is_empty() {
        format!("{} failed", sync.failed.len())
    } else {
        "ok".to_owned()
    }
}
