//! Grid coordinates and distance helpers.
//!
//! The bot reasons on the map's cell grid. Radii that the host expresses in world
//! units use [`WDist`] (1024 per cell); comparisons are always done on squared integer
//! distances so no floating point enters spatial decisions.

use core::ops::{Add, Div, Sub};

/// Number of world units along one cell edge.
pub const CELL_SIZE: i64 = 1024;

/// Cell position on the map grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CPos {
    pub x: i32,
    pub y: i32,
}

impl CPos {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance in cells.
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// True if `other` lies within `radius` of this cell (inclusive).
    pub fn within(self, other: Self, radius: WDist) -> bool {
        self.distance_sq(other) * CELL_SIZE * CELL_SIZE <= radius.0 * radius.0
    }

    /// True if this cell lies in the inclusive box spanned by two corners.
    pub fn in_box(self, top_left: Self, bottom_right: Self) -> bool {
        self.x >= top_left.x
            && self.x <= bottom_right.x
            && self.y >= top_left.y
            && self.y <= bottom_right.y
    }
}

impl Add for CPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for CPos {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::fmt::Display for CPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Length in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct WDist(pub i64);

impl WDist {
    pub const ZERO: Self = Self(0);

    pub const fn from_cells(cells: i32) -> Self {
        Self(cells as i64 * CELL_SIZE)
    }

    pub const fn length(self) -> i64 {
        self.0
    }
}

impl Div<i64> for WDist {
    type Output = Self;

    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

/// Map extent in cells. Valid cells are `0..width` by `0..height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapSize {
    pub width: i32,
    pub height: i32,
}

impl MapSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, cell: CPos) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Radius that covers the whole map from any cell on it.
    pub fn max_search_range(&self) -> i32 {
        self.width.max(self.height)
    }
}

/// Cells whose distance from `center` lies in `[min_range, max_range]`, nearest first.
///
/// Cells at the same distance are ordered by row, then column, so the result is
/// stable across platforms. Cells outside `map` are skipped.
pub fn cells_in_annulus(map: MapSize, center: CPos, min_range: i32, max_range: i32) -> Vec<CPos> {
    let min_range = min_range.max(0);
    if max_range < min_range {
        return Vec::new();
    }

    let min_sq = (min_range as i64) * (min_range as i64);
    let max_sq = (max_range as i64) * (max_range as i64);

    let mut cells = Vec::new();
    for dy in -max_range..=max_range {
        for dx in -max_range..=max_range {
            let cell = CPos::new(center.x + dx, center.y + dy);
            let d = cell.distance_sq(center);
            if d < min_sq || d > max_sq || !map.contains(cell) {
                continue;
            }
            cells.push((d, cell));
        }
    }

    cells.sort_by_key(|&(d, cell)| (d, cell.y, cell.x));
    cells.into_iter().map(|(_, cell)| cell).collect()
}

/// Cells within `radius` of `center`, nearest first.
pub fn cells_in_circle(map: MapSize, center: CPos, radius: i32) -> Vec<CPos> {
    cells_in_annulus(map, center, 0, radius)
}
