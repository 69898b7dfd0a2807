use crate::constants::*;
use crate::errors::GridError;
use crate::location::*;
use bitflags::*;
use log::*;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Set of tile states, used to describe which tiles a graph view keeps.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StateMask: u8 {
        const DRY = 1;
        const FLOODED = 2;
        const DROWNED = 4;
        const REDRIED = 8;

        const LAND = Self::DRY.bits() | Self::REDRIED.bits();
        const WATER = Self::FLOODED.bits() | Self::DROWNED.bits();
        const WALKABLE = Self::LAND.bits() | Self::FLOODED.bits();
    }
}

/// Wetness level of a single tile.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum TileState {
    Dry,
    Flooded,
    Drowned,
    Redried,
}

impl TileState {
    pub fn from_char(c: char) -> Option<TileState> {
        match c {
            '#' => Some(TileState::Dry),
            'o' => Some(TileState::Flooded),
            '.' => Some(TileState::Drowned),
            '~' => Some(TileState::Redried),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            TileState::Dry => '#',
            TileState::Flooded => 'o',
            TileState::Drowned => '.',
            TileState::Redried => '~',
        }
    }

    pub fn mask(self) -> StateMask {
        match self {
            TileState::Dry => StateMask::DRY,
            TileState::Flooded => StateMask::FLOODED,
            TileState::Drowned => StateMask::DROWNED,
            TileState::Redried => StateMask::REDRIED,
        }
    }

    #[inline]
    pub fn is_water(self) -> bool {
        StateMask::WATER.contains(self.mask())
    }

    #[inline]
    pub fn is_dry(self) -> bool {
        !self.is_water()
    }

    /// State after one FLOOD event. Severity only ever increases.
    pub fn flooded(self) -> TileState {
        match self {
            TileState::Dry | TileState::Redried => TileState::Flooded,
            TileState::Flooded | TileState::Drowned => TileState::Drowned,
        }
    }

    /// State after a DRY action. Only flooded tiles change.
    pub fn dried(self) -> TileState {
        match self {
            TileState::Flooded => TileState::Redried,
            other => other,
        }
    }
}

/// The persistent board. This is the only state that survives between turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    columns: usize,
    rows: usize,
    tiles: Vec<TileState>,
}

impl TerrainGrid {
    /// Parse a board snapshot. Rows are separated by whitespace; surrounding
    /// blank lines are ignored.
    pub fn parse(text: &str) -> Result<TerrainGrid, GridError> {
        let lines: Vec<&str> = text.split_whitespace().collect();
        TerrainGrid::from_lines(&lines)
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<TerrainGrid, GridError> {
        let columns = match lines.first() {
            Some(line) => line.as_ref().chars().count(),
            None => return Err(GridError::EmptyBoard),
        };
        if columns == 0 {
            return Err(GridError::EmptyBoard);
        }
        let rows = lines.len();
        if columns > MAX_BOARD_EDGE || rows > MAX_BOARD_EDGE {
            return Err(GridError::BoardTooLarge { columns, rows });
        }

        let mut tiles = Vec::with_capacity(columns * rows);
        for (y, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != columns {
                return Err(GridError::RaggedBoard {
                    row: y,
                    expected: columns,
                    found,
                });
            }
            for (x, c) in line.chars().enumerate() {
                let state =
                    TileState::from_char(c).ok_or(GridError::UnknownTile { x, y, tile: c })?;
                tiles.push(state);
            }
        }

        Ok(TerrainGrid {
            columns,
            rows,
            tiles,
        })
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn contains(&self, location: Location) -> bool {
        (location.x() as usize) < self.columns && (location.y() as usize) < self.rows
    }

    fn index(&self, location: Location) -> Result<usize, GridError> {
        if self.contains(location) {
            Ok(location.y() as usize * self.columns + location.x() as usize)
        } else {
            Err(GridError::OutOfBounds {
                location,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    pub fn get(&self, location: Location) -> Result<TileState, GridError> {
        self.index(location).map(|index| self.tiles[index])
    }

    pub fn get_xy(&self, x: usize, y: usize) -> Result<TileState, GridError> {
        self.get(Location::from_coords(x as u32, y as u32))
    }

    pub fn set(&mut self, location: Location, state: TileState) -> Result<(), GridError> {
        let index = self.index(location)?;
        self.tiles[index] = state;
        Ok(())
    }

    /// Apply a server FLOOD event to one tile.
    pub fn flood(&mut self, location: Location) -> Result<TileState, GridError> {
        let index = self.index(location)?;
        let next = self.tiles[index].flooded();
        trace!("Flooding {}: {:?} -> {:?}", location, self.tiles[index], next);
        self.tiles[index] = next;
        Ok(next)
    }

    /// Apply a DRY action. Tiles that are not flooded are left untouched.
    pub fn dry(&mut self, location: Location) -> Result<TileState, GridError> {
        let index = self.index(location)?;
        let current = self.tiles[index];
        if current != TileState::Flooded {
            trace!("Ignoring dry of {} in state {:?}", location, current);
        }
        self.tiles[index] = current.dried();
        Ok(self.tiles[index])
    }

    /// Fails unless `other` has exactly the same dimensions.
    pub fn ensure_same_dimensions(&self, other: &TerrainGrid) -> Result<(), GridError> {
        if self.columns != other.columns || self.rows != other.rows {
            return Err(GridError::DimensionMismatch {
                expected: (self.columns, self.rows),
                found: (other.columns, other.rows),
            });
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, TileState)> + '_ {
        let columns = self.columns;
        self.tiles.iter().enumerate().map(move |(i, state)| {
            let x = i % columns;
            let y = i / columns;
            (Location::from_coords(x as u32, y as u32), *state)
        })
    }

    pub fn count(&self, state: TileState) -> usize {
        self.tiles.iter().filter(|s| **s == state).count()
    }
}

impl fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.columns) {
            let line: String = row.iter().map(|s| s.as_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// A board-sized array of per-tile data.
#[derive(Clone, Debug)]
pub struct GridArray<T: Copy> {
    columns: usize,
    rows: usize,
    data: Vec<T>,
}

impl<T: Copy> GridArray<T> {
    pub fn new(columns: usize, rows: usize, initial: T) -> Self {
        GridArray {
            columns,
            rows,
            data: vec![initial; columns * rows],
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        let index = y * self.columns + x;
        &self.data[index]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let index = y * self.columns + x;
        &mut self.data[index]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    #[inline]
    pub fn at(&self, location: Location) -> &T {
        self.get(location.x() as usize, location.y() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let columns = self.columns;
        self.data.iter().enumerate().map(move |(i, v)| {
            let x = i % columns;
            let y = i / columns;
            ((x, y), v)
        })
    }
}
