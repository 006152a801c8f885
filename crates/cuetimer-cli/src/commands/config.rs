use clap::Subcommand;
use cuetimer_core::audio::AudioCueSelection;
use cuetimer_core::storage::FileStore;
use cuetimer_core::{PreferenceStore, TimerConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.mode", "audio.volume")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List timer and audio settings
    List,
    /// Reset timer and audio settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open()?;
    match action {
        ConfigAction::Get { key } => {
            let prefs = store.load()?;
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut prefs = store.load()?;
            prefs.set(&key, &value)?;
            store.save(&prefs)?;
            println!("ok");
        }
        ConfigAction::List => {
            let prefs = store.load()?;
            let view = serde_json::json!({
                "timer": prefs.timer,
                "audio": prefs.audio,
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        ConfigAction::Reset => {
            let mut prefs = store.load()?;
            prefs.timer = TimerConfig::default();
            prefs.audio = AudioCueSelection::default();
            store.save(&prefs)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
