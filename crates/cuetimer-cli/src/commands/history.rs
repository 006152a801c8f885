use clap::Subcommand;
use cuetimer_core::format_time;

use super::{catalog, open_engine};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List finished sessions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete all history
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(&catalog()?)?;

    match action {
        HistoryAction::List { json, limit } => {
            let limit = limit.unwrap_or(usize::MAX);
            let entries: Vec<_> = engine.history().recent_first().take(limit).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no sessions yet");
            } else {
                for entry in entries {
                    println!(
                        "{}  {}  (elapsed {})",
                        entry.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                        entry.label(),
                        format_time(entry.elapsed_seconds())
                    );
                }
            }
        }
        HistoryAction::Clear => {
            engine.clear_history();
            println!("history cleared");
        }
    }
    Ok(())
}
