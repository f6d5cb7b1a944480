//! Static tile grid and the collision queries evaluated against it.
//!
//! The grid is immutable for the lifetime of a level. Every query here is a
//! pure function of the grid and its arguments, so the physics step can call
//! them in any order without observing a different answer.

use super::{GridError, HasHitBox, Rect, Side};

/// Raw tile code as authored in the level layout.
pub type TileCode = i32;

/// Gap kept between a resting body and the surface it rests against.
pub const CONTACT_EPSILON: f64 = 1.0;

/// Maximum distance between a hit-box edge and a tile boundary that still
/// counts as touching a wall.
pub const WALL_TOUCH_TOLERANCE: f64 = 2.0;

/// Column-major tile map with a fixed tile size.
///
/// Codes equal to [`TileGrid::EMPTY`] are walkable, codes in
/// `0..TileGrid::SOLID_LIMIT` block movement, and everything else is
/// decorative and therefore walkable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    tiles: Vec<TileCode>,
    columns: usize,
    rows: usize,
    tile_size: f64,
}

impl TileGrid {
    pub const EMPTY: TileCode = -1;
    pub const SOLID_LIMIT: TileCode = 49;

    /// Builds a grid from `columns[col][row]` data.
    pub fn from_columns(columns: Vec<Vec<TileCode>>, tile_size: f64) -> Result<Self, GridError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(GridError::InvalidTileSize(tile_size));
        }
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        if let Some((column, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != height) {
            return Err(GridError::RaggedColumn {
                column,
                expected: height,
                found: col.len(),
            });
        }

        Ok(Self {
            tiles: columns.into_iter().flatten().collect(),
            columns: width,
            rows: height,
            tile_size,
        })
    }

    /// Builds a grid from `rows[row][col]` data, the way layouts are usually
    /// written by hand.
    pub fn from_rows(rows: Vec<Vec<TileCode>>, tile_size: f64) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GridError::RaggedRow {
                row,
                expected: width,
                found: r.len(),
            });
        }

        let columns = (0..width)
            .map(|col| rows.iter().map(|r| r[col]).collect())
            .collect();
        Self::from_columns(columns, tile_size)
    }

    /// Grid of the given dimensions filled with empty tiles.
    pub fn empty(columns: usize, rows: usize, tile_size: f64) -> Result<Self, GridError> {
        Self::from_columns(vec![vec![Self::EMPTY; rows]; columns], tile_size)
    }

    /// Returns a copy with one tile replaced. Out-of-range coordinates are ignored.
    #[must_use]
    pub fn with_tile(mut self, col: usize, row: usize, code: TileCode) -> Self {
        if col < self.columns && row < self.rows {
            self.tiles[col * self.rows + row] = code;
        }
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn width(&self) -> f64 {
        self.columns as f64 * self.tile_size
    }

    pub fn height(&self) -> f64 {
        self.rows as f64 * self.tile_size
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<TileCode> {
        (col < self.columns && row < self.rows).then(|| self.tiles[col * self.rows + row])
    }

    pub const fn is_solid_code(code: TileCode) -> bool {
        code >= 0 && code < Self::SOLID_LIMIT
    }

    /// Tile index containing a world coordinate. May be negative or past the
    /// last column/row.
    fn cell(&self, v: f64) -> i64 {
        (v / self.tile_size).floor() as i64
    }

    fn solid_cell(&self, col: i64, row: i64) -> bool {
        if col < 0 || row < 0 {
            return false;
        }
        self.is_tile_solid(col as usize, row as usize)
    }

    /// Out of range tiles are not solid.
    pub fn is_tile_solid(&self, col: usize, row: usize) -> bool {
        self.tile(col, row).is_some_and(Self::is_solid_code)
    }

    /// World-point query. Everything outside the level counts as solid so
    /// bodies cannot leave it.
    pub fn is_solid_at(&self, x: f64, y: f64) -> bool {
        if x < 0.0 || y < 0.0 || x >= self.width() || y >= self.height() {
            return true;
        }
        self.solid_cell(self.cell(x), self.cell(y))
    }

    /// True when a `w` by `h` box at `(x, y)` overlaps neither a solid tile
    /// nor the outside of the level.
    pub fn can_move_to(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
        let right = x + w;
        let bottom = y + h;
        if self.is_solid_at(x, y)
            || self.is_solid_at(right, y)
            || self.is_solid_at(x, bottom)
            || self.is_solid_at(right, bottom)
        {
            return false;
        }

        // Corners alone miss tiles along the edges of boxes larger than a tile.
        let (c0, c1) = (self.cell(x), self.cell(right));
        let (r0, r1) = (self.cell(y), self.cell(bottom));
        !(c0..=c1).any(|col| (r0..=r1).any(|row| self.solid_cell(col, row)))
    }

    pub fn can_move_rect(&self, rect: &Rect) -> bool {
        self.can_move_to(rect.x, rect.y, rect.width, rect.height)
    }

    /// True when any point one contact epsilon below the bottom edge is
    /// solid. The level's bottom edge counts as floor.
    pub fn is_on_floor(&self, body: &impl HasHitBox) -> bool {
        let hb = body.hit_box();
        let probe = hb.bottom() + CONTACT_EPSILON;
        if probe >= self.height() {
            return true;
        }
        let row = self.cell(probe);
        let (c0, c1) = (self.cell(hb.x), self.cell(hb.right()));
        (c0..=c1).any(|col| self.solid_cell(col, row))
    }

    /// Edge of the hit-box facing `side`.
    fn edge(hb: &Rect, side: Side) -> f64 {
        match side {
            Side::Left => hb.x,
            Side::Right => hb.right(),
        }
    }

    /// Tile boundary nearest to the hit-box edge on `side`.
    fn nearest_boundary(&self, hb: &Rect, side: Side) -> f64 {
        (Self::edge(hb, side) / self.tile_size).round() * self.tile_size
    }

    /// Tolerance-only wall proximity check: the hit-box edge on `side` lies
    /// within [`WALL_TOUCH_TOLERANCE`] of a tile boundary whose far column is
    /// solid (or outside the level).
    pub fn is_touching_wall(&self, body: &impl HasHitBox, side: Side) -> bool {
        let hb = body.hit_box();
        let boundary = self.nearest_boundary(&hb, side);
        if (Self::edge(&hb, side) - boundary).abs() > WALL_TOUCH_TOLERANCE {
            return false;
        }
        self.wall_column_blocks(&hb, side, boundary)
    }

    fn wall_column_blocks(&self, hb: &Rect, side: Side, boundary: f64) -> bool {
        let col = match side {
            Side::Left => self.cell(boundary) - 1,
            Side::Right => self.cell(boundary),
        };
        if col < 0 || col >= self.columns as i64 {
            return true;
        }
        let top = self.cell(hb.y);
        let bottom = self.cell(hb.bottom() - CONTACT_EPSILON);
        self.solid_cell(col, top) && self.solid_cell(col, bottom)
    }

    /// Airborne wall contact: touching a wall on `side` that is solid at both
    /// the top and bottom rows of the hit-box, while not standing on the floor.
    pub fn is_on_wall(&self, body: &impl HasHitBox, side: Side) -> bool {
        !self.is_on_floor(body) && self.is_touching_wall(body, side)
    }

    /// Horizontal visibility between two hit-boxes along `row`.
    pub fn line_of_sight(&self, row: usize, a: &impl HasHitBox, b: &impl HasHitBox) -> bool {
        let (a, b) = (a.hit_box(), b.hit_box());
        let lo = self.cell(a.center_x().min(b.center_x())).max(0);
        let hi = self.cell(a.center_x().max(b.center_x()));
        !(lo..=hi).any(|col| self.solid_cell(col, row as i64))
    }

    /// True when there is solid ground right under the leading edge after
    /// moving by `dx`. Used by walkers to turn around at ledges.
    pub fn is_floor_ahead(&self, body: &impl HasHitBox, dx: f64, side: Side) -> bool {
        let hb = body.hit_box();
        let x = match side {
            Side::Left => hb.x - dx.abs(),
            Side::Right => hb.right() + dx.abs(),
        };
        self.is_solid_at(x, hb.bottom() + CONTACT_EPSILON)
    }

    /// Top of the first solid tile at or below `(x, y)`, or the level bottom.
    pub fn ground_y(&self, x: f64, y: f64) -> f64 {
        let col = self.cell(x);
        let start = self.cell(y).max(0);
        (start..self.rows as i64)
            .find(|&row| self.solid_cell(col, row))
            .map_or(self.height(), |row| row as f64 * self.tile_size)
    }

    /// Top of the highest solid surface a hit-box falling by `dy` would reach,
    /// within one contact epsilon past the move. The level bottom counts.
    pub fn floor_within(&self, hb: &Rect, dy: f64) -> Option<f64> {
        let (c0, c1) = (self.cell(hb.x), self.cell(hb.right()));
        let r0 = self.cell(hb.bottom()).max(0);
        let r1 = self.cell(hb.bottom() + dy.max(0.0) + CONTACT_EPSILON);

        (r0..=r1)
            .find(|&row| row >= self.rows as i64 || (c0..=c1).any(|col| self.solid_cell(col, row)))
            .map(|row| (row as f64 * self.tile_size).min(self.height()))
    }

    /// Resting `y` for a hit-box falling by `dy`: the surface found by
    /// [`TileGrid::floor_within`] minus height and epsilon. Returns the
    /// current `y` when nothing below is in reach.
    pub fn floor_contact_y(&self, hb: &Rect, dy: f64) -> f64 {
        self.floor_within(hb, dy)
            .map_or(hb.y, |top| top - hb.height - CONTACT_EPSILON)
    }

    /// `y` that puts the hit-box flush under the ceiling it would hit when
    /// rising by `dy` (negative). The level top acts as a ceiling.
    pub fn ceiling_contact_y(&self, hb: &Rect, dy: f64) -> f64 {
        let (c0, c1) = (self.cell(hb.x), self.cell(hb.right()));
        let r0 = self.cell(hb.y);
        let r1 = self.cell(hb.y + dy.min(0.0));

        let mut row = r0;
        while row >= r1 {
            if row < 0 {
                return 0.0;
            }
            if (c0..=c1).any(|col| self.solid_cell(col, row)) {
                return (row + 1) as f64 * self.tile_size;
            }
            row -= 1;
        }
        hb.y
    }

    /// `x` that puts the hit-box flush against the first wall met when moving
    /// by `dx`. Returns the current `x` when nothing is in reach.
    pub fn wall_contact_x(&self, hb: &Rect, dx: f64) -> f64 {
        let (r0, r1) = (self.cell(hb.y), self.cell(hb.bottom()));
        let blocked = |col: i64| {
            col < 0 || col >= self.columns as i64 || (r0..=r1).any(|row| self.solid_cell(col, row))
        };

        if dx > 0.0 {
            let (from, to) = (self.cell(hb.right()), self.cell(hb.right() + dx));
            if let Some(col) = (from..=to).find(|&c| blocked(c)) {
                return col as f64 * self.tile_size - hb.width - CONTACT_EPSILON;
            }
        } else if dx < 0.0 {
            let (from, to) = (self.cell(hb.x), self.cell(hb.x + dx));
            let mut col = from;
            while col >= to {
                if blocked(col) {
                    return (col + 1) as f64 * self.tile_size;
                }
                col -= 1;
            }
        }
        hb.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 32.0;

    /// 8 x 6 grid, solid floor on the bottom row, a pillar at column 5 rows 2..=4.
    fn room() -> TileGrid {
        let mut grid = TileGrid::empty(8, 6, T).unwrap();
        for col in 0..8 {
            grid = grid.with_tile(col, 5, 1);
        }
        for row in 2..5 {
            grid = grid.with_tile(5, row, 3);
        }
        grid
    }

    #[test]
    fn out_of_range_tiles_are_not_solid() {
        let grid = room();
        assert!(!grid.is_tile_solid(100, 0));
        assert!(!grid.is_tile_solid(0, 100));
        assert!(grid.is_tile_solid(0, 5));
    }

    #[test]
    fn decorative_codes_are_walkable() {
        let grid = room().with_tile(1, 1, 49).with_tile(2, 1, 120);
        assert!(!grid.is_tile_solid(1, 1));
        assert!(!grid.is_tile_solid(2, 1));
        assert!(grid.can_move_to(33.0, 33.0, 60.0, 20.0));
    }

    #[test]
    fn ragged_input_is_rejected() {
        let err = TileGrid::from_columns(vec![vec![-1, -1], vec![-1]], T).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedColumn {
                column: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            TileGrid::from_columns(vec![], T).unwrap_err(),
            GridError::Empty
        );
        assert!(matches!(
            TileGrid::from_columns(vec![vec![-1]], 0.0),
            Err(GridError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn from_rows_transposes() {
        let grid = TileGrid::from_rows(vec![vec![-1, 2, -1], vec![0, -1, -1]], T).unwrap();
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 2);
        assert!(grid.is_tile_solid(1, 0));
        assert!(grid.is_tile_solid(0, 1));
        assert!(!grid.is_tile_solid(2, 1));
    }

    #[test]
    fn can_move_to_is_pure() {
        let grid = room();
        let first = grid.can_move_to(150.0, 60.0, 15.0, 44.0);
        let second = grid.can_move_to(150.0, 60.0, 15.0, 44.0);
        assert_eq!(first, second);
        assert!(!first);
    }

    #[test]
    fn wide_boxes_see_tiles_between_corners() {
        let grid = TileGrid::empty(6, 6, T).unwrap().with_tile(2, 2, 0);
        // Corners fall in columns 1 and 3, rows 1 and 3; the only solid tile
        // sits between them.
        assert!(!grid.can_move_to(40.0, 40.0, 70.0, 70.0));
    }

    #[test]
    fn on_floor_matches_blocked_step_below() {
        let grid = room();
        let floor_top = 5.0 * T;
        let resting = Rect::new(40.0, floor_top - 44.0 - CONTACT_EPSILON, 15.0, 44.0);
        assert!(grid.is_on_floor(&resting));
        assert!(!grid.can_move_to(resting.x, resting.y + CONTACT_EPSILON, 15.0, 44.0));

        let hovering = resting.translated(0.0, -10.0);
        assert!(!grid.is_on_floor(&hovering));
        assert!(grid.can_move_to(hovering.x, hovering.y + CONTACT_EPSILON, 15.0, 44.0));
    }

    #[test]
    fn level_edges_act_as_walls() {
        let grid = room();
        let hb = Rect::new(0.5, 40.0, 15.0, 44.0);
        assert!(grid.is_touching_wall(&hb, Side::Left));
        assert!(grid.is_on_wall(&hb, Side::Left));
        assert!(!grid.is_on_wall(&hb, Side::Right));
    }

    #[test]
    fn wall_needs_solid_top_and_bottom_rows() {
        let grid = room();
        // Right edge flush against the pillar at column 5 (x = 160).
        let beside = Rect::new(160.0 - 15.0 - CONTACT_EPSILON, 2.0 * T + 4.0, 15.0, 44.0);
        assert!(grid.is_on_wall(&beside, Side::Right));

        // Head above the pillar: only the bottom row is solid.
        let above = beside.at(beside.x, T - 10.0);
        assert!(!grid.is_on_wall(&above, Side::Right));
    }

    #[test]
    fn wall_state_requires_being_airborne() {
        let grid = room();
        let standing = Rect::new(160.0 - 16.0, 5.0 * T - 44.0 - CONTACT_EPSILON, 15.0, 44.0);
        assert!(grid.is_on_floor(&standing));
        assert!(!grid.is_on_wall(&standing, Side::Right));
    }

    #[test]
    fn line_of_sight_is_blocked_by_pillar() {
        let grid = room();
        let a = Rect::new(40.0, 100.0, 15.0, 44.0);
        let b = Rect::new(220.0, 100.0, 15.0, 44.0);
        let c = Rect::new(100.0, 100.0, 15.0, 44.0);
        assert!(!grid.line_of_sight(3, &a, &b));
        assert!(grid.line_of_sight(3, &a, &c));
        assert!(grid.line_of_sight(1, &a, &b));
    }

    #[test]
    fn contact_targets_are_flush() {
        let grid = room();
        let falling = Rect::new(40.0, 100.0, 15.0, 44.0);
        let y = grid.floor_contact_y(&falling, 30.0);
        assert_eq!(y, 5.0 * T - 44.0 - CONTACT_EPSILON);

        let pillar_left = Rect::new(130.0, 80.0, 15.0, 20.0);
        assert_eq!(
            grid.wall_contact_x(&pillar_left, 20.0),
            5.0 * T - 15.0 - CONTACT_EPSILON
        );
        let pillar_right = Rect::new(200.0, 80.0, 15.0, 20.0);
        assert_eq!(grid.wall_contact_x(&pillar_right, -20.0), 6.0 * T);

        let roof = TileGrid::empty(4, 6, T).unwrap().with_tile(1, 1, 0);
        let rising = Rect::new(40.0, 70.0, 15.0, 44.0);
        assert_eq!(roof.ceiling_contact_y(&rising, -10.0), 2.0 * T);
    }

    #[test]
    fn ground_y_and_ledges() {
        let grid = room().with_tile(3, 5, TileGrid::EMPTY);
        assert_eq!(grid.ground_y(40.0, 0.0), 5.0 * T);
        assert_eq!(grid.ground_y(100.0, 0.0), grid.height());

        let walker = Rect::new(70.0, 5.0 * T - 45.0, 15.0, 44.0);
        assert!(!grid.is_floor_ahead(&walker, 20.0, Side::Right));
        assert!(grid.is_floor_ahead(&walker, 5.0, Side::Left));
    }
}
