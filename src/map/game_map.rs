//! Dense rectangular hex map
//!
//! Terrain only. Units, villages owners and sides live on the game board.

use serde::{Deserialize, Serialize};

use crate::core::error::{RecruitError, Result};
use crate::map::location::Location;
use crate::map::terrain::Terrain;

/// The full game map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    width: u32,
    height: u32,
    tiles: Vec<Terrain>,
}

impl GameMap {
    /// Create a new map filled with flat terrain
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Terrain::Flat; (width * height) as usize],
        }
    }

    /// Parse a map from rows of terrain symbols (see `Terrain::symbol`).
    /// Whitespace inside a row is ignored; blank lines are skipped.
    pub fn from_ascii(layout: &str) -> Result<Self> {
        let mut rows: Vec<Vec<Terrain>> = Vec::new();
        for (line_no, line) in layout.lines().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.is_empty() {
                continue;
            }
            let row = symbols
                .into_iter()
                .map(|c| {
                    Terrain::from_symbol(c).ok_or_else(|| {
                        RecruitError::InvalidConfig(format!(
                            "unknown terrain symbol '{}' on line {}",
                            c,
                            line_no + 1
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if width == 0 {
            return Err(RecruitError::InvalidConfig("empty map layout".into()));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(RecruitError::InvalidConfig(format!(
                "map row {} has {} hexes, expected {}",
                bad + 1,
                rows[bad].len(),
                width
            )));
        }

        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinate is within map bounds
    pub fn on_board(&self, loc: Location) -> bool {
        loc.x >= 0 && loc.y >= 0 && loc.x < self.width as i32 && loc.y < self.height as i32
    }

    /// Dense index of an on-board location (row-major)
    pub fn index(&self, loc: Location) -> Option<usize> {
        if !self.on_board(loc) {
            return None;
        }
        Some((loc.y as u32 * self.width + loc.x as u32) as usize)
    }

    pub fn location_at(&self, index: usize) -> Location {
        let width = self.width as usize;
        Location::new((index % width) as i32, (index / width) as i32)
    }

    pub fn terrain_at(&self, loc: Location) -> Option<Terrain> {
        self.index(loc).map(|i| self.tiles[i])
    }

    /// Set terrain at a coordinate
    pub fn set_terrain(&mut self, loc: Location, terrain: Terrain) -> Result<()> {
        let index = self.index(loc).ok_or(RecruitError::InvalidLocation(loc))?;
        self.tiles[index] = terrain;
        Ok(())
    }

    pub fn is_keep(&self, loc: Location) -> bool {
        self.terrain_at(loc).is_some_and(|t| t.is_keep())
    }

    pub fn is_castle(&self, loc: Location) -> bool {
        self.terrain_at(loc).is_some_and(|t| t.is_castle())
    }

    pub fn is_village(&self, loc: Location) -> bool {
        self.terrain_at(loc).is_some_and(|t| t.is_village())
    }

    /// All on-board locations in row-major order
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.tiles.len()).map(move |i| self.location_at(i))
    }

    pub fn villages(&self) -> impl Iterator<Item = Location> + '_ {
        self.locations().filter(move |loc| self.is_village(*loc))
    }

    /// On-board neighbors of a location, in direction order
    pub fn adjacent_on_board(&self, loc: Location) -> impl Iterator<Item = Location> + '_ {
        loc.neighbors().into_iter().filter(move |n| self.on_board(*n))
    }
}
