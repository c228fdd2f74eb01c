//! Tunable waystone rules.
//!
//! Loaded leniently: a missing or unparseable file logs a warning and falls
//! back to defaults so a bad edit never keeps the server from starting. The
//! authorizer reads the config live on every request; nothing from here is
//! copied into records.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default on-disk location for the waystone rules.
pub const DEFAULT_WAYSTONES_CONFIG_PATH: &str = "config/waystones.toml";

/// Tunable rules consumed by the directory and the teleport authorizer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WaystonesConfig {
    /// When set, every waystone is visible and teleportable by every player
    /// without individual discovery. Also makes "forget" destructive at the
    /// directory level.
    pub global_discovery: bool,
    /// XP levels charged for an ordinary teleport. Zero disables cost.
    pub teleport_cost_levels: u32,
    /// Ticks a player must wait between ordinary teleports. Zero disables
    /// the cooldown.
    pub cooldown_ticks: u64,
    /// Cost multiplier applied when the target waystone is in a different
    /// dimension.
    pub cross_dimension_cost_multiplier: f32,
    /// Same-dimension teleports closer than this many blocks are free.
    pub free_below_distance: f64,
}

impl Default for WaystonesConfig {
    fn default() -> Self {
        Self {
            global_discovery: false,
            teleport_cost_levels: 1,
            cooldown_ticks: 0,
            cross_dimension_cost_multiplier: 2.0,
            free_below_distance: 16.0,
        }
    }
}

impl WaystonesConfig {
    /// Load the rules from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_WAYSTONES_CONFIG_PATH))
    }

    /// Load the rules from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<WaystonesConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    WaystonesConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Waystones config not found at {}. Using defaults",
                        path.display()
                    );
                }
                WaystonesConfig::default()
            }
        }
    }

    /// Save the rules to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = WaystonesConfig::load_from_path(Path::new("/definitely/not/here.toml"));
        assert_eq!(cfg, WaystonesConfig::default());
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let cfg: WaystonesConfig = toml::from_str("global_discovery = true").unwrap();
        assert!(cfg.global_discovery);
        assert_eq!(
            cfg.teleport_cost_levels,
            WaystonesConfig::default().teleport_cost_levels
        );
    }

    #[test]
    fn saved_config_round_trips() {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("waystones_cfg_{timestamp}.toml"));

        let cfg = WaystonesConfig {
            global_discovery: true,
            teleport_cost_levels: 3,
            cooldown_ticks: 100,
            cross_dimension_cost_multiplier: 1.5,
            free_below_distance: 8.0,
        };
        cfg.save_to_path(&path).expect("config saves");
        assert_eq!(WaystonesConfig::load_from_path(&path), cfg);

        let _ = fs::remove_file(&path);
    }
}
