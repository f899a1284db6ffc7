use std::time::Duration;

use clap::Subcommand;
use tabletick_core::tap::RoundStatus;
use tabletick_core::{
    Config, Database, Event, RankingBoard, RankingStore, Signals, SystemClock, TapController,
    TapDuration, TapPhase,
};

use crate::console::{print_json, Console, Input};

/// Upper bound on one wait for input, so the countdown keeps moving.
const INPUT_SLICE_MS: u64 = 100;

#[derive(Subcommand)]
pub enum TapAction {
    /// Play rounds in the terminal: Enter taps, `r` resets, `q` quits
    Play {
        /// Round length in seconds (3, 5, 10, 30 or 60)
        #[arg(long)]
        duration: Option<u32>,
    },
}

type Controller = TapController<SystemClock, Box<dyn RankingStore>>;

pub fn run(action: TapAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        TapAction::Play { duration } => {
            let duration = match duration {
                Some(secs) => TapDuration::try_from(secs)?,
                None => config.tap.default_duration,
            };
            let board = RankingBoard::new(config.ranking_store(Database::open()?)?);
            let signals = Signals::from_config(&config.signals);
            let mut ctl = TapController::new(SystemClock, board, signals, duration);
            play(&mut ctl, duration)
        }
    }
}

fn play(ctl: &mut Controller, duration: TapDuration) -> Result<(), Box<dyn std::error::Error>> {
    let console = Console::spawn();
    loop {
        eprintln!("{duration} round: Enter taps, r = reset, q = quit");
        print_json(&ctl.start(duration))?;

        match run_round(ctl, &console)? {
            RoundEnd::Quit => return Ok(()),
            RoundEnd::Reset => continue,
            RoundEnd::Finished => {}
        }

        if ctl.status() == RoundStatus::Qualified && !register(ctl, &console)? {
            return Ok(());
        }

        eprintln!("Enter = play again, q = quit");
        console.drain();
        match console.read_line().as_deref().map(str::trim) {
            None | Some("q") => return Ok(()),
            Some(_) => {}
        }
    }
}

enum RoundEnd {
    Finished,
    Reset,
    Quit,
}

fn run_round(ctl: &mut Controller, console: &Console) -> Result<RoundEnd, Box<dyn std::error::Error>> {
    loop {
        for event in ctl.poll() {
            match &event {
                Event::TapCountdown { remaining_secs } => eprint!("{remaining_secs}... "),
                Event::TapFinished { .. } => {
                    eprintln!();
                    print_json(&event)?;
                }
                _ => print_json(&event)?,
            }
        }
        if ctl.session().phase() == TapPhase::Finished {
            return Ok(RoundEnd::Finished);
        }

        let wait = ctl.until_next_tick().unwrap_or(INPUT_SLICE_MS).min(INPUT_SLICE_MS);
        match console.next(Duration::from_millis(wait.max(1))) {
            Input::Idle => {}
            Input::Closed => return Ok(RoundEnd::Quit),
            Input::Line(line) => match line.trim() {
                "q" => return Ok(RoundEnd::Quit),
                "r" => {
                    print_json(&ctl.reset())?;
                    return Ok(RoundEnd::Reset);
                }
                _ => {
                    ctl.tap();
                }
            },
        }
    }
}

/// Ask for a name until the score is on the board or the player gives up.
/// Returns `false` when input has closed.
fn register(ctl: &mut Controller, console: &Console) -> Result<bool, Box<dyn std::error::Error>> {
    console.drain();
    loop {
        eprintln!("New high score! Enter your name (empty to skip):");
        let Some(name) = console.read_line() else {
            return Ok(false);
        };
        if name.trim().is_empty() {
            return Ok(true);
        }

        let result = ctl.register(&name);
        print_json(&ctl.registration_event(&result))?;
        match result {
            Ok(registration) => {
                print_json(&registration.bucket)?;
                return Ok(true);
            }
            Err(e) => {
                tracing::warn!(error = %e, "score registration failed");
                if ctl.status() != RoundStatus::Qualified {
                    return Ok(true);
                }
                eprintln!("Retry? [Y/n]");
                match console.read_line().as_deref().map(str::trim) {
                    None => return Ok(false),
                    Some("n") | Some("N") => return Ok(true),
                    Some(_) => {}
                }
            }
        }
    }
}
