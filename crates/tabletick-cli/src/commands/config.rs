use clap::Subcommand;
use tabletick_core::{Config, ConfigError};

const KEYS_HELP: &str = "Keys: turn.player_names, turn.player_count, turn.seconds_per_turn, \
tap.default_duration, signals.sound, signals.vibration, signals.volume, signals.output, \
ranking.backend, ranking.endpoint, ranking.settle_delay_ms, ranking.timeout_ms";

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value; a section name such as `ranking` prints the section as JSON
    #[command(after_help = KEYS_HELP)]
    Get {
        /// Dotted key, e.g. `turn.seconds_per_turn`
        key: String,
    },
    /// Change one value and save; the whole config is checked before writing
    #[command(after_help = KEYS_HELP)]
    Set {
        /// Dotted key, e.g. `signals.output`
        key: String,
        /// New value: `bell|audio|silent` for signals.output, `local|remote` for
        /// ranking.backend, a JSON array for turn.player_names
        value: String,
    },
    /// Print the whole config
    List {
        /// JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Overwrite config.toml with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
