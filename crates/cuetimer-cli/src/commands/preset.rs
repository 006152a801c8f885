use clap::Subcommand;
use cuetimer_core::{format_time, parse_time, seconds_to_hms, Preset};

use super::{catalog, list_index, open_engine};

#[derive(Subcommand)]
pub enum PresetAction {
    /// Add a preset duration (SS, MM:SS or HH:MM:SS)
    Add {
        duration: String,
        /// Display label
        #[arg(long)]
        label: Option<String>,
    },
    /// List presets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a preset by its list number
    Update {
        number: usize,
        duration: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove a preset by its list number
    Remove { number: usize },
    /// Switch the timer to a countdown of this preset's duration
    Apply { number: usize },
}

fn preset_from(duration: &str, label: Option<String>) -> Result<Preset, Box<dyn std::error::Error>> {
    let hms = seconds_to_hms(parse_time(duration)?);
    Ok(Preset::new(
        hms.hours,
        hms.minutes,
        hms.seconds,
        label.unwrap_or_default(),
    ))
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(&catalog()?)?;

    match action {
        PresetAction::Add { duration, label } => {
            let preset = preset_from(&duration, label)?;
            let name = preset.display_label();
            let index = engine.add_preset(preset);
            println!("preset {} added: {name}", index + 1);
        }
        PresetAction::List { json } => {
            let presets = engine.presets();
            if json {
                println!("{}", serde_json::to_string_pretty(presets)?);
            } else {
                for (i, preset) in presets.iter().enumerate() {
                    println!(
                        "{:>3}. {:<12} {}",
                        i + 1,
                        preset.display_label(),
                        format_time(preset.total_seconds())
                    );
                }
            }
        }
        PresetAction::Update {
            number,
            duration,
            label,
        } => {
            let index = list_index(number, engine.presets().len(), "preset")?;
            engine.update_preset(index, preset_from(&duration, label)?)?;
            println!("preset {number} updated");
        }
        PresetAction::Remove { number } => {
            let index = list_index(number, engine.presets().len(), "preset")?;
            let removed = engine.remove_preset(index)?;
            println!("removed preset {}", removed.display_label());
        }
        PresetAction::Apply { number } => {
            let index = list_index(number, engine.presets().len(), "preset")?;
            engine.apply_preset(index)?;
            println!(
                "timer set to countdown {}",
                format_time(engine.config().target_seconds)
            );
        }
    }
    Ok(())
}
