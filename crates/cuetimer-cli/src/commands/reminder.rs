use clap::Subcommand;
use cuetimer_core::{format_time, parse_time, ReminderSet};

use super::{catalog, list_index, open_engine};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Add a reminder at a model time (SS, MM:SS or HH:MM:SS)
    Add {
        /// Trigger time; defaults to 00:00 for countdown, target + 5 min for countup
        #[arg(allow_hyphen_values = true)]
        at: Option<String>,
        /// Message shown when it fires
        message: Option<String>,
    },
    /// List reminders in trigger order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a reminder by its list number
    Update {
        number: usize,
        /// New trigger time
        #[arg(long)]
        at: Option<String>,
        /// New message
        #[arg(long)]
        message: Option<String>,
    },
    /// Remove a reminder by its list number
    Remove { number: usize },
}

/// Times arrive as text; a leading '-' must still surface as a negative
/// reminder rather than a parse error.
fn parse_at(text: &str) -> Result<i64, Box<dyn std::error::Error>> {
    match text.trim().strip_prefix('-') {
        Some(rest) => Ok(-i64::try_from(parse_time(rest)?)?),
        None => Ok(i64::try_from(parse_time(text)?)?),
    }
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(&catalog()?)?;

    match action {
        ReminderAction::Add { at, message } => {
            let at = match at {
                Some(text) => parse_at(&text)?,
                None => i64::try_from(ReminderSet::default_at_seconds(engine.config()))?,
            };
            let id = engine.add_reminder(at, message)?;
            if let Some(reminder) = engine.reminders().get(id) {
                println!("reminder added at {}", format_time(reminder.at_seconds()));
            }
        }
        ReminderAction::List { json } => {
            let reminders = engine.reminders().sorted();
            if json {
                println!("{}", serde_json::to_string_pretty(&reminders)?);
            } else if reminders.is_empty() {
                println!("no reminders");
            } else {
                for (i, reminder) in reminders.iter().enumerate() {
                    println!(
                        "{:>3}. {}  {}",
                        i + 1,
                        format_time(reminder.at_seconds()),
                        reminder.text()
                    );
                }
            }
        }
        ReminderAction::Update {
            number,
            at,
            message,
        } => {
            let id = {
                let sorted = engine.reminders().sorted();
                sorted[list_index(number, sorted.len(), "reminder")?].id()
            };
            let at = at.as_deref().map(parse_at).transpose()?;
            engine.update_reminder(id, at, message)?;
            println!("reminder {number} updated");
        }
        ReminderAction::Remove { number } => {
            let id = {
                let sorted = engine.reminders().sorted();
                sorted[list_index(number, sorted.len(), "reminder")?].id()
            };
            let removed = engine.remove_reminder(id)?;
            println!("removed reminder at {}", format_time(removed.at_seconds()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_times_survive_parsing() {
        assert_eq!(parse_at("1:30").unwrap(), 90);
        assert_eq!(parse_at("-5").unwrap(), -5);
        assert!(parse_at("--5").is_err());
    }
}
