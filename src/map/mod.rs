//! Hex grid primitives: locations, terrain and the terrain map

pub mod game_map;
pub mod location;
pub mod terrain;

pub use game_map::GameMap;
pub use location::{Direction, Location};
pub use terrain::Terrain;
