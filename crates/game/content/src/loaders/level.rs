//! Level layout loader.
//!
//! A level file describes the static tile grid, the spawn point of the
//! entity and everything placed on top of the grid:
//!
//! ```ron
//! (
//!     name: "demo",
//!     tile_size: 32.0,
//!     layout: Rows([
//!         "#....#",
//!         "######",
//!     ]),
//!     spawn: (40.0, 10.0),
//!     objects: [(kind: Container, x: 96.0, y: 20.0, width: 30.0, height: 30.0)],
//!     props: [(kind: JumpPad, x: 150.0, y: 40.0, width: 32.0, height: 8.0, power: -9.0)],
//! )
//! ```

use std::path::Path;

use platformer_core::{
    GameError, ObjectId, ObjectKind, ObjectSet, Prop, PropKind, Rect, TileCode, TileGrid, Vec2,
    WorldObject,
};
use serde::Deserialize;
use tracing::debug;

use crate::loaders::{LoadResult, read_file};

/// Tile code written for `~` in row layouts.
const DECORATION: TileCode = 60;

/// A fully resolved level, ready to hand to the simulation.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub grid: TileGrid,
    /// Top-left corner of the entity's hit-box.
    pub spawn: Vec2,
    pub objects: ObjectSet,
    pub props: Vec<Prop>,
}

#[derive(Debug, Deserialize)]
struct LevelRon {
    #[serde(default)]
    name: Option<String>,
    tile_size: f64,
    layout: LayoutRon,
    spawn: (f64, f64),
    #[serde(default)]
    objects: Vec<ObjectRon>,
    #[serde(default)]
    props: Vec<PropRon>,
}

/// Tile layout, either as picture rows or raw codes (`codes[row][col]`).
#[derive(Debug, Deserialize)]
enum LayoutRon {
    /// `#` solid, `.` empty, `~` decorative.
    Rows(Vec<String>),
    Codes(Vec<Vec<TileCode>>),
}

#[derive(Debug, Deserialize)]
struct ObjectRon {
    kind: ObjectKind,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct PropRon {
    kind: PropKind,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    power: Option<f64>,
}

/// Loader for level layouts from RON files.
pub struct LevelLoader;

impl LevelLoader {
    /// Load a level from a RON file. The file stem names the level unless
    /// the file sets `name` itself.
    pub fn load(path: &Path) -> LoadResult<Level> {
        let content = read_file(path)?;
        let fallback = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("level");
        Self::parse(&content, fallback)
            .map_err(|e| anyhow::anyhow!("Invalid level {}: {}", path.display(), e))
    }

    /// Parse a level from RON text.
    pub fn parse(content: &str, fallback_name: &str) -> LoadResult<Level> {
        let data: LevelRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level RON: {}", e))?;

        let rows = match data.layout {
            LayoutRon::Rows(lines) => lines
                .iter()
                .enumerate()
                .map(|(row, line)| parse_row(row, line))
                .collect::<LoadResult<Vec<_>>>()?,
            LayoutRon::Codes(codes) => codes,
        };
        let grid = TileGrid::from_rows(rows, data.tile_size)
            .map_err(|e| anyhow::anyhow!("{} [{} {}]", e, e.severity().as_str(), e.error_code()))?;

        let spawn = Vec2::new(data.spawn.0, data.spawn.1);
        if !(spawn.x.is_finite() && spawn.y.is_finite()) {
            anyhow::bail!("spawn point must be finite");
        }

        // Objects take the first ids, props continue the sequence.
        let mut next_id = 1u32;
        let mut objects = ObjectSet::default();
        for entry in data.objects {
            let hit_box = placement(entry.x, entry.y, entry.width, entry.height)?;
            objects.push(WorldObject::new(ObjectId(next_id), entry.kind, hit_box));
            next_id += 1;
        }

        let mut props = Vec::with_capacity(data.props.len());
        for entry in data.props {
            let hit_box = placement(entry.x, entry.y, entry.width, entry.height)?;
            let mut prop = Prop::new(ObjectId(next_id), entry.kind, hit_box);
            if let Some(power) = entry.power {
                prop = prop.with_power(power);
            }
            props.push(prop);
            next_id += 1;
        }

        let name = data.name.unwrap_or_else(|| fallback_name.to_string());
        debug!(
            level = %name,
            columns = grid.columns(),
            rows = grid.rows(),
            objects = objects.len(),
            props = props.len(),
            "level loaded"
        );

        Ok(Level {
            name,
            grid,
            spawn,
            objects,
            props,
        })
    }
}

fn parse_row(row: usize, line: &str) -> LoadResult<Vec<TileCode>> {
    line.chars()
        .enumerate()
        .map(|(col, c)| match c {
            '#' => Ok(0),
            '.' => Ok(TileGrid::EMPTY),
            '~' => Ok(DECORATION),
            other => Err(anyhow::anyhow!(
                "unknown tile '{}' at row {}, column {}",
                other,
                row,
                col
            )),
        })
        .collect()
}

fn placement(x: f64, y: f64, width: f64, height: f64) -> LoadResult<Rect> {
    if ![x, y, width, height].iter().all(|v| v.is_finite()) || width <= 0.0 || height <= 0.0 {
        anyhow::bail!("invalid placement ({x}, {y}, {width}x{height})");
    }
    Ok(Rect::new(x, y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LEVEL: &str = r########"(
        tile_size: 32.0,
        layout: Rows([
            "#....~#",
            "#.....#",
            "#######",
        ]),
        spawn: (40.0, 20.0),
        objects: [
            (kind: Container, x: 96.0, y: 20.0, width: 30.0, height: 30.0),
            (kind: Brick, x: 130.0, y: 20.0, width: 30.0, height: 30.0),
        ],
        props: [
            (kind: JumpPad, x: 150.0, y: 56.0, width: 32.0, height: 8.0, power: -9.0),
            (kind: Spike, x: 64.0, y: 56.0, width: 32.0, height: 8.0),
        ],
    )"########;

    #[test]
    fn loads_rows_objects_and_props() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cave.ron");
        fs::write(&path, LEVEL).unwrap();

        let level = LevelLoader::load(&path).unwrap();
        assert_eq!(level.name, "cave");
        assert_eq!((level.grid.columns(), level.grid.rows()), (7, 3));
        assert!(level.grid.is_tile_solid(0, 0));
        assert!(!level.grid.is_tile_solid(1, 0));
        assert!(!level.grid.is_tile_solid(5, 0));
        assert_eq!(level.grid.tile(5, 0), Some(DECORATION));
        assert_eq!(level.spawn, Vec2::new(40.0, 20.0));

        let ids: Vec<_> = level.objects.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![ObjectId(1), ObjectId(2)]);
        assert_eq!(level.props[0].id, ObjectId(3));
        assert_eq!(level.props[0].kind, PropKind::JumpPad);
        assert_eq!(level.props[0].power, -9.0);
        assert_eq!(level.props[1].id, ObjectId(4));
    }

    #[test]
    fn accepts_raw_codes_and_explicit_name() {
        let level = LevelLoader::parse(
            "(name: \"codes\", tile_size: 16.0, layout: Codes([[-1, 3], [0, 0]]), spawn: (0.0, 0.0))",
            "fallback",
        )
        .unwrap();
        assert_eq!(level.name, "codes");
        assert_eq!(level.grid.tile_size(), 16.0);
        assert!(level.grid.is_tile_solid(1, 0));
        assert!(level.objects.is_empty() && level.props.is_empty());
    }

    #[test]
    fn rejects_ragged_and_unknown_tiles() {
        let ragged = LevelLoader::parse(
            "(tile_size: 32.0, layout: Rows([\"##\", \"#\"]), spawn: (0.0, 0.0))",
            "x",
        )
        .unwrap_err();
        assert!(ragged.to_string().contains("GRID_"));

        let unknown = LevelLoader::parse(
            "(tile_size: 32.0, layout: Rows([\"#?\"]), spawn: (0.0, 0.0))",
            "x",
        )
        .unwrap_err();
        assert!(unknown.to_string().contains("unknown tile '?'"));
    }

    #[test]
    fn rejects_degenerate_placement() {
        let err = LevelLoader::parse(
            "(tile_size: 32.0, layout: Rows([\"#\"]), spawn: (0.0, 0.0), \
             objects: [(kind: Brick, x: 0.0, y: 0.0, width: 0.0, height: 10.0)])",
            "x",
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid placement"));
    }
}
