use std::{
    env, fs, io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_RATING_CONFIG: &str = include_str!("data/rating_config.json");

/// Engine configuration: seeding, worker threads, the command socket and
/// the roster of records spawned when the app is built.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub roller_seed: u64,
    /// `0` uses the global rayon pool, `1` runs passes sequentially.
    pub worker_threads: usize,
    pub command_bind: SocketAddr,
    pub roster: Vec<RosterEntry>,
}

/// Authored record. The rating stays textual so one bad entry cannot sink
/// the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub rating: String,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            roller_seed: 20240611,
            worker_threads: 0,
            command_bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 41101),
            roster: Vec::new(),
        }
    }
}

impl RatingConfig {
    pub fn builtin() -> Self {
        match Self::from_json_str(BUILTIN_RATING_CONFIG) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    target: "esoteric::config",
                    error = %err,
                    "rating_config.builtin_invalid"
                );
                Self::default()
            }
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, RatingConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| RatingConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let config = RatingConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum RatingConfigError {
    #[error("failed to parse rating config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read rating config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load configuration from `RATING_CONFIG_PATH`, falling back to the builtin
/// file. Returns the path that was used, if any.
pub fn load_rating_config_from_env() -> (RatingConfig, Option<PathBuf>) {
    if let Some(path) = env::var("RATING_CONFIG_PATH").ok().map(PathBuf::from) {
        match RatingConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "esoteric::config",
                    path = %path.display(),
                    "rating_config.loaded=file"
                );
                return (config, Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "esoteric::config",
                    path = %path.display(),
                    error = %err,
                    "rating_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "esoteric::config", "rating_config.loaded=builtin");
    (RatingConfig::builtin(), None)
}
