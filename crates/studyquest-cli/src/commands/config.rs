use clap::Subcommand;
use serde::Serialize;
use studyquest_core::{Config, ConfigError};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting as a bare value
    Get {
        /// Dot path such as "timer.focus_minutes" or "rewards.task_added"
        key: String,
    },
    /// Change one setting and save the file
    Set { key: String, value: String },
    /// Put one setting back to its default
    Unset { key: String },
    /// Print every setting, or only one section ("rewards", "timer", ...)
    List { section: Option<String> },
    /// Print the location of config.toml
    Path,
    /// Overwrite config.toml with the defaults
    Reset,
}

/// What `set` and `unset` report.
#[derive(Serialize)]
struct Change {
    key: String,
    from: Option<String>,
    to: String,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
            Ok(())
        }
        ConfigAction::Set { key, value } => change(key, value),
        ConfigAction::Unset { key } => {
            let default = Config::default()
                .get(&key)
                .ok_or_else(|| ConfigError::UnknownKey(key.clone()))?;
            change(key, default)
        }
        ConfigAction::List { section } => {
            let mut tree = serde_json::to_value(Config::load()?)?;
            if let Some(section) = section {
                tree = tree
                    .get_mut(&section)
                    .map(serde_json::Value::take)
                    .ok_or(ConfigError::UnknownKey(section))?;
            }
            println!("{}", serde_json::to_string_pretty(&tree)?);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            tracing::info!("config reset to defaults");
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Validate and save one setting. Nothing is written when the value is rejected.
fn change(key: String, to: String) -> CmdResult {
    let mut config = Config::load()?;
    let from = config.get(&key);
    config.set(&key, &to)?;
    config.save()?;
    tracing::info!(%key, "config updated");
    println!(
        "{}",
        serde_json::to_string_pretty(&Change { key, from, to })?
    );
    Ok(())
}
