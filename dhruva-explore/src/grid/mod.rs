//! Occupancy grid snapshot consumed by one planning cycle.
//!
//! Cells are stored row-major in a single owned buffer and addressed by a
//! linear index `y * width + x`. Every accessor is bounds-checked: a neighbor
//! that would cross the grid edge is `None`, never a wrapped index.
//!
//! ```text
//!   up_left   up    up_right        (y + 1)
//!   left     cell   right
//!   down_left down  down_right      (y - 1)
//! ```

mod cell;

pub use cell::CellClass;

use crate::config::PlannerConfig;
use crate::core::{GridCoord, WorldPoint};
use crate::error::{ExploreError, Result};

/// Immutable per-cycle occupancy snapshot.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    /// Cell size in meters
    resolution: f32,
    /// World position of the lower-left corner of cell (0, 0)
    origin: WorldPoint,
    cells: Vec<CellClass>,
}

impl OccupancyGrid {
    /// Wrap a provider's cell buffer.
    ///
    /// The buffer must hold exactly `width * height` cells.
    pub fn new(
        width: usize,
        height: usize,
        resolution: f32,
        origin: WorldPoint,
        cells: Vec<CellClass>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ExploreError::DegenerateGrid(format!(
                "grid has zero size ({}x{})",
                width, height
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(ExploreError::InvalidInput(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            ExploreError::InvalidInput(format!("grid {}x{} is too large", width, height))
        })?;
        if cells.len() != expected {
            return Err(ExploreError::InvalidInput(format!(
                "cell buffer holds {} cells, expected {}",
                cells.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            resolution,
            origin,
            cells,
        })
    }

    /// Grid with every cell set to `class`.
    pub fn filled(
        width: usize,
        height: usize,
        resolution: f32,
        origin: WorldPoint,
        class: CellClass,
    ) -> Result<Self> {
        Self::new(
            width,
            height,
            resolution,
            origin,
            vec![class; width.saturating_mul(height)],
        )
    }

    /// Parse a character map (`.` free, `#` occupied, `+` inflated, `?` unknown).
    ///
    /// The first non-empty line is the top row (highest `y`), so the text reads
    /// the same way the map looks. Surrounding whitespace on each line is ignored.
    pub fn from_ascii(text: &str, resolution: f32, origin: WorldPoint) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut cells = vec![CellClass::Unknown; width * height];

        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(ExploreError::InvalidInput(format!(
                    "map row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    width
                )));
            }
            let y = height - 1 - row;
            for (x, c) in line.chars().enumerate() {
                cells[y * width + x] = CellClass::from_char(c).ok_or_else(|| {
                    ExploreError::InvalidInput(format!("unknown map symbol '{}' in row {}", c, row))
                })?;
            }
        }

        Self::new(width, height, resolution, origin, cells)
    }

    /// Render back to the character notation of [`Self::from_ascii`].
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.cells[y * self.width + x].as_char());
            }
            out.push('\n');
        }
        out
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cells(&self) -> &[CellClass] {
        &self.cells
    }

    /// Overwrite one cell. Returns `false` if `coord` is outside the grid.
    pub fn set(&mut self, coord: GridCoord, class: CellClass) -> bool {
        match self.index_of(coord) {
            Some(index) => {
                self.cells[index] = class;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        index < self.cells.len()
    }

    #[inline]
    pub fn class(&self, index: usize) -> Option<CellClass> {
        self.cells.get(index).copied()
    }

    #[inline]
    pub fn class_at(&self, coord: GridCoord) -> Option<CellClass> {
        self.index_of(coord).and_then(|i| self.class(i))
    }

    #[inline]
    pub fn is_valid_coord(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    #[inline]
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn coord_of(&self, index: usize) -> Option<GridCoord> {
        if self.is_valid(index) {
            Some(GridCoord::new(
                (index % self.width) as i32,
                (index / self.width) as i32,
            ))
        } else {
            None
        }
    }

    #[inline]
    fn offset(&self, index: usize, dx: i32, dy: i32) -> Option<usize> {
        let coord = self.coord_of(index)?;
        self.index_of(GridCoord::new(coord.x + dx, coord.y + dy))
    }

    #[inline]
    pub fn left(&self, index: usize) -> Option<usize> {
        self.offset(index, -1, 0)
    }

    #[inline]
    pub fn up(&self, index: usize) -> Option<usize> {
        self.offset(index, 0, 1)
    }

    #[inline]
    pub fn right(&self, index: usize) -> Option<usize> {
        self.offset(index, 1, 0)
    }

    #[inline]
    pub fn down(&self, index: usize) -> Option<usize> {
        self.offset(index, 0, -1)
    }

    #[inline]
    pub fn up_left(&self, index: usize) -> Option<usize> {
        self.offset(index, -1, 1)
    }

    #[inline]
    pub fn up_right(&self, index: usize) -> Option<usize> {
        self.offset(index, 1, 1)
    }

    #[inline]
    pub fn down_right(&self, index: usize) -> Option<usize> {
        self.offset(index, 1, -1)
    }

    #[inline]
    pub fn down_left(&self, index: usize) -> Option<usize> {
        self.offset(index, -1, -1)
    }

    /// Left, up, right, down.
    pub fn straight_neighbors(&self, index: usize) -> [Option<usize>; 4] {
        [
            self.left(index),
            self.up(index),
            self.right(index),
            self.down(index),
        ]
    }

    /// Up-left, up-right, down-right, down-left.
    pub fn diagonal_neighbors(&self, index: usize) -> [Option<usize>; 4] {
        [
            self.up_left(index),
            self.up_right(index),
            self.down_right(index),
            self.down_left(index),
        ]
    }

    /// All 8 neighbors, straight ones first.
    pub fn adjacent(&self, index: usize) -> [Option<usize>; 8] {
        let [l, u, r, d] = self.straight_neighbors(index);
        let [ul, ur, dr, dl] = self.diagonal_neighbors(index);
        [l, u, r, d, ul, ur, dr, dl]
    }

    /// World point to grid coordinate. The result may lie outside the grid.
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        let x = ((point.x - self.origin.x) / self.resolution).floor() as i32;
        let y = ((point.y - self.origin.y) / self.resolution).floor() as i32;
        GridCoord::new(x, y)
    }

    #[inline]
    pub fn world_to_index(&self, point: WorldPoint) -> Option<usize> {
        self.index_of(self.world_to_grid(point))
    }

    /// Center of a grid cell in world coordinates.
    pub fn grid_to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    #[inline]
    pub fn index_to_world(&self, index: usize) -> Option<WorldPoint> {
        self.coord_of(index).map(|c| self.grid_to_world(c))
    }

    /// Whether a wavefront or a path may enter this cell.
    ///
    /// Unknown cells are passable only with `plan_in_unknown`; inflated cells
    /// only when `use_inflated_obs` is off.
    pub fn is_passable(&self, index: usize, config: &PlannerConfig) -> bool {
        match self.class(index) {
            Some(CellClass::Free) => true,
            Some(CellClass::Unknown) => config.plan_in_unknown,
            Some(CellClass::InflatedOccupied) => !config.use_inflated_obs,
            Some(CellClass::Occupied) | None => false,
        }
    }

    /// Whether this cell seeds the obstacle transform.
    pub fn is_obstacle_seed(&self, index: usize, config: &PlannerConfig) -> bool {
        match self.class(index) {
            Some(CellClass::Occupied) => true,
            Some(CellClass::InflatedOccupied) => config.use_inflated_obs,
            _ => false,
        }
    }

    /// Whether any 8-neighbor of `index` is unknown.
    pub fn touches_unknown(&self, index: usize) -> bool {
        self.adjacent(index)
            .iter()
            .flatten()
            .any(|&n| self.class(n) == Some(CellClass::Unknown))
    }

    pub fn count(&self, class: CellClass) -> usize {
        self.cells.iter().filter(|&&c| c == class).count()
    }
}
