//! Hex coordinate system for game maps (offset coordinates)
//!
//! Columns are flat-topped hexes; odd columns sit half a hex lower than even
//! ones. Coordinates are 0-based.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Map coordinate (column, row)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    /// The "no location" value. Never on any map.
    pub const NULL: Location = Location { x: -1000, y: -1000 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    fn column_is_even(&self) -> bool {
        self.x.rem_euclid(2) == 0
    }

    /// Adjacent hex in the given direction
    pub fn neighbor(&self, direction: Direction) -> Location {
        let even = self.column_is_even();
        match direction {
            Direction::North => Location::new(self.x, self.y - 1),
            Direction::NorthEast => Location::new(self.x + 1, if even { self.y - 1 } else { self.y }),
            Direction::SouthEast => Location::new(self.x + 1, if even { self.y } else { self.y + 1 }),
            Direction::South => Location::new(self.x, self.y + 1),
            Direction::SouthWest => Location::new(self.x - 1, if even { self.y } else { self.y + 1 }),
            Direction::NorthWest => Location::new(self.x - 1, if even { self.y - 1 } else { self.y }),
        }
    }

    /// All 6 neighbors, indexed by `Direction as usize`
    pub fn neighbors(&self) -> [Location; 6] {
        Direction::ALL.map(|direction| self.neighbor(direction))
    }

    /// Number of hex steps between two locations
    pub fn distance(&self, other: &Location) -> u32 {
        let hdistance = (self.x - other.x).abs();
        let vpenalty = if (self.column_is_even() && !other.column_is_even() && self.y < other.y)
            || (other.column_is_even() && !self.column_is_even() && other.y < self.y)
        {
            1
        } else {
            0
        };
        hdistance.max((self.y - other.y).abs() + vpenalty + hdistance / 2) as u32
    }

    pub fn is_adjacent(&self, other: &Location) -> bool {
        self.distance(other) == 1
    }

    /// All hexes within `radius` steps (inclusive), grown ring by ring
    pub fn tiles_within_radius(&self, radius: u32) -> BTreeSet<Location> {
        let mut result = BTreeSet::new();
        result.insert(*self);

        let mut ring = vec![*self];
        for _ in 0..radius {
            let mut next_ring = Vec::new();
            for loc in &ring {
                for adjacent in loc.neighbors() {
                    if result.insert(adjacent) {
                        next_ring.push(adjacent);
                    }
                }
            }
            ring = next_ring;
        }
        result
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The six hex directions, in clockwise order starting north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same() {
        let a = Location::new(3, 3);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_neighbors_are_adjacent_both_parities() {
        for origin in [Location::new(4, 4), Location::new(5, 4), Location::new(-3, 2)] {
            let neighbors = origin.neighbors();
            for n in neighbors {
                assert_eq!(origin.distance(&n), 1, "{origin} -> {n}");
                assert_eq!(n.distance(&origin), 1, "{n} -> {origin}");
            }
            let unique: BTreeSet<_> = neighbors.iter().collect();
            assert_eq!(unique.len(), 6);
        }
    }

    #[test]
    fn test_neighbor_order_is_stable() {
        let even = Location::new(2, 2);
        assert_eq!(
            even.neighbors(),
            [
                Location::new(2, 1),
                Location::new(3, 1),
                Location::new(3, 2),
                Location::new(2, 3),
                Location::new(1, 2),
                Location::new(1, 1),
            ]
        );
        let odd = Location::new(3, 2);
        assert_eq!(odd.neighbor(Direction::NorthEast), Location::new(4, 2));
        assert_eq!(odd.neighbor(Direction::SouthWest), Location::new(2, 3));
    }

    #[test]
    fn test_opposite_direction_returns_home() {
        let origin = Location::new(7, 3);
        for direction in Direction::ALL {
            let there = origin.neighbor(direction);
            assert_eq!(there.neighbor(direction.opposite()), origin);
        }
    }

    #[test]
    fn test_distance_two_steps() {
        let a = Location::new(0, 0);
        assert_eq!(a.distance(&Location::new(1, 1)), 2);
        assert_eq!(a.distance(&Location::new(2, 0)), 2);
        assert_eq!(a.distance(&Location::new(0, 2)), 2);
    }

    #[test]
    fn test_tiles_within_radius_counts() {
        let center = Location::new(10, 10);
        assert_eq!(center.tiles_within_radius(0).len(), 1);
        assert_eq!(center.tiles_within_radius(1).len(), 7);
        assert_eq!(center.tiles_within_radius(2).len(), 19);
        assert_eq!(center.tiles_within_radius(3).len(), 37);
    }

    #[test]
    fn test_tiles_within_radius_matches_distance() {
        for center in [Location::new(6, 6), Location::new(7, 6)] {
            let tiles = center.tiles_within_radius(4);
            for x in 0..14 {
                for y in 0..14 {
                    let loc = Location::new(x, y);
                    assert_eq!(tiles.contains(&loc), center.distance(&loc) <= 4, "{loc}");
                }
            }
        }
    }

    #[test]
    fn test_null_location() {
        assert!(Location::NULL.is_null());
        assert!(!Location::new(0, 0).is_null());
    }
}
