use std::time::Duration;

use clap::Subcommand;
use tabletick_core::turn::TURN_TICK_MS;
use tabletick_core::{
    Config, Database, Event, GameHistory, Signals, SystemClock, TurnController, TurnPhase,
    TurnSession,
};

use crate::console::{print_json, Console, Input};

#[derive(Subcommand)]
pub enum TurnAction {
    /// Start a game
    Start {
        /// Number of players (2-4)
        #[arg(long)]
        players: Option<usize>,
        /// Seconds per turn
        #[arg(long)]
        seconds: Option<u32>,
    },
    /// Pass the turn to the next player
    Next,
    /// Print current state as JSON
    Status,
    /// Abort the game
    Reset,
    /// Show past games
    History {
        /// Show at most this many games
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Delete all recorded games
        #[arg(long)]
        clear: bool,
    },
    /// Play in the terminal: Enter passes the turn, `r` resets, `q` quits
    Play {
        #[arg(long)]
        players: Option<usize>,
        #[arg(long)]
        seconds: Option<u32>,
    },
}

fn load_session(db: &Database, config: &Config) -> TurnSession {
    let mut session = TurnSession::load(db, config.roster());
    // Renamed players apply from the next game on.
    let roster = config.roster();
    if session.phase() != TurnPhase::Running && session.roster() != roster.as_slice() {
        session.set_roster(roster);
    }
    session
}

fn save(db: &Database, ctl: TurnController<SystemClock>) -> Result<(), Box<dyn std::error::Error>> {
    let (session, history) = ctl.into_parts();
    session.save(db)?;
    history.save(db)?;
    Ok(())
}

pub fn run(action: TurnAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let signals = Signals::from_config(&config.signals);
    let mut ctl = TurnController::new(
        SystemClock,
        load_session(&db, &config),
        signals,
        GameHistory::load(&db),
    );

    match action {
        TurnAction::Start { players, seconds } => {
            let event = ctl.start(
                players.unwrap_or(config.turn.player_count),
                seconds.unwrap_or(config.turn.seconds_per_turn),
            )?;
            print_json(&event)?;
        }
        TurnAction::Next => match ctl.advance() {
            Some(event) => print_json(&event)?,
            None => print_json(&ctl.snapshot())?,
        },
        TurnAction::Status => {
            let events = ctl.tick();
            print_json(&ctl.snapshot())?;
            for event in events.iter().filter(|e| matches!(e, Event::TurnOver { .. })) {
                print_json(event)?;
            }
        }
        TurnAction::Reset => {
            print_json(&ctl.reset())?;
        }
        TurnAction::History { limit, clear } => {
            if clear {
                ctl.clear_history();
                println!("history cleared");
            } else {
                let games: Vec<_> = ctl.history().entries().take(limit).collect();
                print_json(&games)?;
            }
        }
        TurnAction::Play { players, seconds } => {
            play(
                &mut ctl,
                players.unwrap_or(config.turn.player_count),
                seconds.unwrap_or(config.turn.seconds_per_turn),
            )?;
        }
    }

    save(&db, ctl)
}

fn play(
    ctl: &mut TurnController<SystemClock>,
    players: usize,
    seconds: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let console = Console::spawn();
    eprintln!("Enter = next player, r = reset, s = new game, q = quit");
    print_json(&ctl.start(players, seconds)?)?;

    let mut shown_second = None;
    loop {
        for event in ctl.poll() {
            if !matches!(event, Event::TurnWarning { .. }) {
                eprintln!();
                print_json(&event)?;
            }
            if let Event::TurnOver { loser, .. } = &event {
                eprintln!("{loser} ran out of time. s = new game, q = quit");
            }
        }

        if ctl.session().phase() == TurnPhase::Running {
            let secs = ctl.remaining_ms().div_ceil(1000);
            if shown_second != Some(secs) {
                shown_second = Some(secs);
                let player = ctl.session().current_player().unwrap_or_default();
                eprint!("\r{player}: {secs:>3}s ");
            }
        }

        match console.next(Duration::from_millis(TURN_TICK_MS / 2)) {
            Input::Idle => {}
            Input::Closed => break,
            Input::Line(line) => match line.trim() {
                "q" => break,
                "r" => {
                    eprintln!();
                    print_json(&ctl.reset())?;
                }
                "s" => {
                    eprintln!();
                    shown_second = None;
                    print_json(&ctl.start(players, seconds)?)?;
                }
                _ => {
                    if let Some(event) = ctl.advance() {
                        shown_second = None;
                        eprintln!();
                        print_json(&event)?;
                        if let Event::TurnOver { loser, .. } = &event {
                            eprintln!("{loser} ran out of time. s = new game, q = quit");
                        }
                    }
                }
            },
        }
    }
    eprintln!();
    Ok(())
}
