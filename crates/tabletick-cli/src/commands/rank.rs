use chrono::{SecondsFormat, Utc};
use clap::Subcommand;
use tabletick_core::{Config, Database, RankEntry, RankingBoard, TapDuration};

use crate::console::print_json;

#[derive(Subcommand)]
pub enum RankAction {
    /// Print the top 5 for one duration, or for all of them
    Show {
        /// Round length in seconds (3, 5, 10, 30 or 60)
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Register a score directly
    Submit {
        #[arg(long)]
        duration: u32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        score: u32,
    },
    /// Empty the board for one duration (local backend only)
    Clear {
        #[arg(long)]
        duration: u32,
    },
}

pub fn run(action: RankAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let board = RankingBoard::new(config.ranking_store(Database::open()?)?);

    match action {
        RankAction::Show { duration } => {
            let durations = match duration {
                Some(secs) => vec![TapDuration::try_from(secs)?],
                None => TapDuration::ALL.to_vec(),
            };
            let boards: serde_json::Map<String, serde_json::Value> = durations
                .into_iter()
                .map(|d| Ok((d.to_string(), serde_json::to_value(board.load(d))?)))
                .collect::<Result<_, serde_json::Error>>()?;
            print_json(&boards)?;
        }
        RankAction::Submit {
            duration,
            name,
            score,
        } => {
            let duration = TapDuration::try_from(duration)?;
            let score = i64::from(score);
            if !board.qualifies(duration, score) {
                println!("score {score} does not make the {duration} board");
                return Ok(());
            }
            let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let registration = board.register(duration, RankEntry::new(&name, score, date)?)?;
            print_json(&registration)?;
        }
        RankAction::Clear { duration } => {
            let duration = TapDuration::try_from(duration)?;
            board.clear(duration)?;
            println!("{duration} board cleared");
        }
    }
    Ok(())
}
