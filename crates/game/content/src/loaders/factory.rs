//! Content factory resolving level and tuning files inside a data directory.

use std::path::{Path, PathBuf};

use platformer_core::PhysicsConfig;

use crate::loaders::{ConfigLoader, Level, LevelLoader, LoadResult};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── levels/
///     ├── demo.ron
///     └── cave.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load physics tuning from `config.toml`, falling back to the defaults
    /// when the file does not exist.
    pub fn load_config(&self) -> LoadResult<PhysicsConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(PhysicsConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load a level from `levels/{level_name}.ron`.
    pub fn load_level(&self, level_name: &str) -> LoadResult<Level> {
        LevelLoader::load(&self.level_path(level_name))
    }

    pub fn level_path(&self, level_name: &str) -> PathBuf {
        self.data_dir
            .join("levels")
            .join(format!("{}.ron", level_name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(
            factory.level_path("demo"),
            Path::new("/tmp/data/levels/demo.ron")
        );
    }

    #[test]
    fn loads_config_and_level_from_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(temp_dir.path());

        assert_eq!(factory.load_config().unwrap(), PhysicsConfig::default());

        fs::write(temp_dir.path().join("config.toml"), "walk_speed = 2.0").unwrap();
        assert_eq!(factory.load_config().unwrap().walk_speed, 2.0);

        fs::create_dir(temp_dir.path().join("levels")).unwrap();
        fs::write(
            factory.level_path("box"),
            "(tile_size: 32.0, layout: Rows([\"#..#\", \"####\"]), spawn: (33.0, 0.0))",
        )
        .unwrap();
        let level = factory.load_level("box").unwrap();
        assert_eq!(level.name, "box");
        assert_eq!(level.grid.columns(), 4);

        assert!(factory.load_level("missing").is_err());
    }
}
