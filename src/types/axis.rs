//! Grid axis selector.

use std::fmt;

/// One of the three grid axes.
///
/// Horizontal axes are centred on the grid centre; the depth axis starts at
/// the top of the model and is positive down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    North,
    East,
    Depth,
}

impl Axis {
    /// All axes in model array order (north, east, depth).
    pub const ALL: [Axis; 3] = [Axis::North, Axis::East, Axis::Depth];

    /// Position of this axis in `[north, east, depth]` arrays.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Axis::North => 0,
            Axis::East => 1,
            Axis::Depth => 2,
        }
    }

    /// True for north and east.
    #[inline]
    pub fn is_horizontal(&self) -> bool {
        !matches!(self, Axis::Depth)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Axis::North => "north",
            Axis::East => "east",
            Axis::Depth => "depth",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
