use serde::*;
use std::fmt;

/// A tile coordinate on the board, 0-based. `x` is the column, `y` the row.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Location {
    packed: u32,
}

impl Location {
    pub fn from_coords(x: u32, y: u32) -> Self {
        Location {
            packed: ((x & 0xFFFF) << 16) | (y & 0xFFFF),
        }
    }

    #[inline]
    pub fn x(self) -> u16 {
        ((self.packed >> 16) & 0xFFFF) as u16
    }

    #[inline]
    pub fn y(self) -> u16 {
        (self.packed & 0xFFFF) as u16
    }

    #[inline]
    pub fn packed_repr(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Location { packed }
    }

    /// Manhattan distance. Admissible as an A* heuristic on a 4-connected grid.
    pub fn distance_to(self, other: Self) -> u32 {
        let dx = (self.x() as i32) - (other.x() as i32);
        let dy = (self.y() as i32) - (other.y() as i32);

        dx.unsigned_abs() + dy.unsigned_abs()
    }

    /// The adjacent location in `direction`, or `None` when it would leave the
    /// non-negative coordinate space. Upper bounds are checked by the grid.
    pub fn step(self, direction: Direction) -> Option<Location> {
        let (dx, dy) = direction.delta();
        let nx = self.x() as i32 + dx;
        let ny = self.y() as i32 + dy;
        if nx < 0 || ny < 0 || nx > u16::MAX as i32 || ny > u16::MAX as i32 {
            return None;
        }
        Some(Location::from_coords(nx as u32, ny as u32))
    }

    /// Direction of a single step from `self` to `other`. Anything that is not
    /// an orthogonal neighbour maps to `Current`.
    pub fn direction_to(self, other: Self) -> Direction {
        let dx = other.x() as i32 - self.x() as i32;
        let dy = other.y() as i32 - self.y() as i32;
        match (dx, dy) {
            (-1, 0) => Direction::West,
            (1, 0) => Direction::East,
            (0, -1) => Direction::North,
            (0, 1) => Direction::South,
            _ => Direction::Current,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Location::from_packed)
    }
}

/// A move or dry target relative to the bot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Current,
}

impl Direction {
    /// Neighbour order used everywhere a fixed priority is needed.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::Current => (0, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Current => Direction::Current,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
            Direction::Current => "CURRENT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
