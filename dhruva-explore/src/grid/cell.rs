//! Cell classes of the occupancy snapshot.

use serde::{Deserialize, Serialize};

/// Occupancy class of a single grid cell, as supplied by the grid provider.
///
/// - `Unknown` - not yet observed
/// - `Free` - observed and traversable
/// - `Occupied` - lethal obstacle
/// - `InflatedOccupied` - within the robot's inscribed radius of an obstacle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellClass {
    #[default]
    Unknown = 0,
    Free = 1,
    Occupied = 2,
    InflatedOccupied = 3,
}

impl CellClass {
    #[inline]
    pub fn is_known(self) -> bool {
        self != CellClass::Unknown
    }

    /// Occupied or inflated-occupied.
    #[inline]
    pub fn is_obstacle(self) -> bool {
        matches!(self, CellClass::Occupied | CellClass::InflatedOccupied)
    }

    /// Parse the single-character map notation used by [`super::OccupancyGrid::from_ascii`].
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellClass::Free),
            '#' => Some(CellClass::Occupied),
            '+' => Some(CellClass::InflatedOccupied),
            '?' => Some(CellClass::Unknown),
            _ => None,
        }
    }

    /// Single character representation for debugging
    pub fn as_char(self) -> char {
        match self {
            CellClass::Unknown => '?',
            CellClass::Free => '.',
            CellClass::Occupied => '#',
            CellClass::InflatedOccupied => '+',
        }
    }
}
