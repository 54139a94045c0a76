use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hint::RevealPolicy;
use crate::utils::get_data_dir;

const CONFIG_FILE_NAME: &str = "config.json";

/// Settings stored in `config.json` under the data dir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// How hints pick their one extra revealed character.
    pub reveal_policy: RevealPolicy,
    /// `None` keeps the full answer log; `Some(n)` keeps the newest n rows.
    pub log_retention: Option<u32>,
}

pub fn config_file_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CONFIG_FILE_NAME))
}

/// A missing file is not an error and yields defaults; anything else
/// (permissions, bad JSON) propagates.
pub fn load() -> Result<Config> {
    let path = config_file_path()?;
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read config file at {}", path.display()));
        }
    };

    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid config file at {}", path.display()))
}

pub fn save(config: &Config) -> Result<()> {
    let path = config_file_path()?;
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write config file at {}", path.display()))
}
