//! Physics tuning loader.

use std::path::Path;

use platformer_core::{GameError, PhysicsConfig};
use serde::Deserialize;
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

/// TOML layout: any subset of [`PhysicsConfig`] fields plus an optional
/// `scale` applied to every distance and speed.
#[derive(Debug, Deserialize)]
struct ConfigToml {
    #[serde(default)]
    scale: Option<f64>,
    #[serde(flatten)]
    physics: PhysicsConfig,
}

/// Loader for physics tuning from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load tuning from a TOML file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> LoadResult<PhysicsConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    /// Parse and validate tuning from TOML text.
    pub fn parse(content: &str) -> LoadResult<PhysicsConfig> {
        let data: ConfigToml = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        let config = match data.scale {
            Some(scale) if scale.is_finite() && scale > 0.0 => data.physics.scaled(scale),
            Some(scale) => anyhow::bail!("scale must be a positive number (got {scale})"),
            None => data.physics,
        };
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("{} [{} {}]", e, e.severity().as_str(), e.error_code()))?;

        debug!(scale = ?data.scale, walk_speed = config.walk_speed, "physics config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "walk_speed = 0.8\ndash_duration_ticks = 30\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.walk_speed, 0.8);
        assert_eq!(config.dash_duration_ticks, 30);
        assert_eq!(config.gravity_down, PhysicsConfig::default().gravity_down);
    }

    #[test]
    fn scale_applies_to_distances() {
        let config = ConfigLoader::parse("scale = 2.0").unwrap();
        let base = PhysicsConfig::default();
        assert_eq!(config.hit_box_width, base.hit_box_width * 2.0);
        assert_eq!(config.cooldown_tick, base.cooldown_tick);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ConfigLoader::parse("jump_speed = 1.5").unwrap_err();
        assert!(err.to_string().contains("CONFIG_JUMP_SPEED_NOT_UPWARD"));

        assert!(ConfigLoader::parse("scale = -1.0").is_err());
        assert!(ConfigLoader::parse("walk_speed = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::load(&temp_dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
