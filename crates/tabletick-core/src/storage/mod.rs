mod config;
pub mod database;

pub use config::{
    Config, RankingBackend, RankingConfig, SignalOutput, SignalsConfig, TapConfig, TurnConfig,
};
pub use database::Database;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `TABLETICK_HOME` overrides the location. Otherwise the directory is
/// `~/.config/tabletick[-dev]/`, with the `-dev` suffix selected by
/// `TABLETICK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TABLETICK_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TABLETICK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("tabletick-dev")
            } else {
                base_dir.join("tabletick")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
