use std::time::Duration;

use clap::Subcommand;
use cuetimer_core::audio::decode_all;
use cuetimer_core::timer::COMPLETION_CUE_SECS;

use super::{catalog, open_engine, sounds_dir};

/// Gap between the short and long cue of a sound test.
const TEST_GAP: Duration = Duration::from_secs(1);

#[derive(Subcommand)]
pub enum SoundAction {
    /// List available cues and the current selection
    List,
    /// Play the short cue, then the long cue
    Test,
    /// Choose the short (reminder) and long (completion) cues
    Select { short: String, long: String },
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = catalog()?;
    let mut engine = open_engine(&catalog)?;

    match action {
        SoundAction::List => {
            let selection = engine.audio().selection();
            println!("cue directory: {}", sounds_dir()?.display());
            for id in catalog.ids() {
                let mut tags = Vec::new();
                if id == selection.short_cue_id {
                    tags.push("short");
                }
                if id == selection.long_cue_id {
                    tags.push("long");
                }
                if catalog.source(id).is_some_and(|p| !p.exists()) {
                    tags.push("missing");
                }
                if tags.is_empty() {
                    println!("  {id}");
                } else {
                    println!("  {id} ({})", tags.join(", "));
                }
            }
            println!(
                "sound {}, volume {:.0}%",
                if selection.enabled { "on" } else { "off" },
                selection.volume * 100.0
            );
        }
        SoundAction::Test => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(async {
                for (id, result) in decode_all(&catalog).await {
                    engine.install_cue(&id, result);
                }

                let audio = engine.audio_mut();
                audio.test_cues();
                tokio::time::sleep(TEST_GAP).await;
                audio.play_long();

                let deadline =
                    tokio::time::Instant::now() + Duration::from_secs(COMPLETION_CUE_SECS as u64);
                while audio.is_busy() && tokio::time::Instant::now() < deadline {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                audio.stop_all();
            });

            match engine.audio().last_failure() {
                Some(e) => println!("sound test incomplete: {e}"),
                None => println!("sound test done"),
            }
        }
        SoundAction::Select { short, long } => {
            engine.select_cues(&short, &long)?;
            println!("short cue: {short}, long cue: {long}");
        }
    }
    Ok(())
}
