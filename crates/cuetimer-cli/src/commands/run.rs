//! Foreground session: drives the engine once per second and renders a
//! status line until the run completes or the user quits.

use std::io::Write;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use cuetimer_core::audio::spawn_decoding;
use cuetimer_core::{
    format_time, parse_time, Event, Snapshot, TimerConfig, TimerEngine, TimerMode, TimerState,
};

use super::{catalog, open_engine};

const AUDIO_POLL: Duration = Duration::from_millis(250);

#[derive(Args)]
pub struct RunArgs {
    /// Count up instead of down
    #[arg(long)]
    countup: bool,
    /// Target duration (SS, MM:SS or HH:MM:SS); 0 means no ceiling when counting up
    #[arg(long)]
    target: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Key {
    Toggle,
    Reset,
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim() {
        "p" | "P" | "" => Some(Key::Toggle),
        "r" | "R" => Some(Key::Reset),
        "q" | "Q" => Some(Key::Quit),
        _ => None,
    }
}

fn status_line(snapshot: &Snapshot) -> String {
    let state = match snapshot.state {
        TimerState::Idle => "idle",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
        TimerState::Completed => "done",
    };
    let ceiling = match (snapshot.mode, snapshot.target_seconds) {
        (TimerMode::Countup, 0) => String::new(),
        (_, target) => format!(" / {}", format_time(target)),
    };
    format!(
        "{} {}{} [{}] {:>3.0}%",
        snapshot.mode.label(),
        snapshot.display,
        ceiling,
        state,
        snapshot.progress * 100.0
    )
}

fn render(snapshot: &Snapshot) {
    let mut stdout = std::io::stdout();
    if let Err(e) = write!(stdout, "\r\x1b[2K{}", status_line(snapshot)).and_then(|()| stdout.flush()) {
        tracing::debug!("status line not rendered: {e}");
    }
}

fn apply_args(engine: &mut TimerEngine, args: &RunArgs) -> cuetimer_core::error::Result<()> {
    if !args.countup && args.target.is_none() {
        return Ok(());
    }
    let target_seconds = match &args.target {
        Some(text) => parse_time(text)?,
        None => engine.config().target_seconds,
    };
    let mode = if args.countup {
        TimerMode::Countup
    } else {
        TimerMode::Countdown
    };
    engine.apply_config(TimerConfig {
        mode,
        target_seconds,
    })?;
    Ok(())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = catalog()?;
    let mut engine = open_engine(&catalog)?;
    apply_args(&mut engine, &args)?;

    engine.subscribe(|event| tracing::debug!(?event, "timer event"));
    engine.subscribe(|event| {
        if let Event::TimerReset {
            outcome: Some(outcome),
            ..
        } = event
        {
            println!("\nsession {}", outcome.label());
        }
    });

    let mut decoded = spawn_decoding(&catalog);
    let mut decoding = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut audio_poll = tokio::time::interval(AUDIO_POLL);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    eprintln!("keys: p + Enter pause/resume, r reset, q quit");
    engine.start();
    render(&engine.snapshot());

    loop {
        tokio::select! {
            _ = ticker.tick(), if engine.state() == TimerState::Running => {
                let Some(report) = engine.tick() else { continue };
                for reminder in &report.fired {
                    println!("\n{} {}", format_time(reminder.at_seconds()), reminder.text());
                }
                render(&report.snapshot);
                if report.completed {
                    println!("\ntime's up");
                }
            }
            result = decoded.recv(), if decoding => match result {
                Some((id, result)) => engine.install_cue(&id, result),
                None => decoding = false,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_key(&line) {
                    Some(Key::Toggle) => {
                        engine.toggle();
                        if engine.state() == TimerState::Running {
                            ticker.reset_immediately();
                        }
                        render(&engine.snapshot());
                    }
                    Some(Key::Reset) => {
                        engine.abandon();
                        render(&engine.snapshot());
                    }
                    Some(Key::Quit) => {
                        engine.abandon();
                        break;
                    }
                    None => eprintln!("unknown key '{}'", line.trim()),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("stdin closed: {e}");
                    stdin_open = false;
                }
            },
            _ = audio_poll.tick() => {
                engine.poll_audio();
                if engine.state() == TimerState::Completed && !engine.audio_busy() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                engine.abandon();
                break;
            }
        }
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(parse_key("p"), Some(Key::Toggle));
        assert_eq!(parse_key(" R \n"), Some(Key::Reset));
        assert_eq!(parse_key("Q"), Some(Key::Quit));
        assert_eq!(parse_key(""), Some(Key::Toggle));
        assert_eq!(parse_key("x"), None);
    }

    #[test]
    fn status_line_shows_ceiling_only_when_set() {
        let snapshot = Snapshot {
            state: TimerState::Running,
            mode: TimerMode::Countup,
            model_seconds: 65,
            target_seconds: 0,
            progress: 0.0,
            display: "01:05".into(),
        };
        assert_eq!(status_line(&snapshot), "Countup 01:05 [running]   0%");

        let snapshot = Snapshot {
            mode: TimerMode::Countdown,
            target_seconds: 120,
            progress: 0.5,
            display: "01:00".into(),
            ..snapshot
        };
        assert_eq!(status_line(&snapshot), "Countdown 01:00 / 02:00 [running]  50%");
    }
}
