//! Terrain types and their static properties
//!
//! Movement cost and defense are properties of the unit's movement type, not of
//! the terrain. Terrain only knows what it is and how it is drawn in ASCII maps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base terrain of a hex
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub enum Terrain {
    #[default]
    Flat,
    Forest,
    Hills,
    Mountains,
    ShallowWater,
    DeepWater,
    Swamp,
    Sand,
    Cave,
    Castle,
    Keep,
    Village,
    Impassable,
}

impl Terrain {
    pub const ALL: [Terrain; 13] = [
        Terrain::Flat,
        Terrain::Forest,
        Terrain::Hills,
        Terrain::Mountains,
        Terrain::ShallowWater,
        Terrain::DeepWater,
        Terrain::Swamp,
        Terrain::Sand,
        Terrain::Cave,
        Terrain::Castle,
        Terrain::Keep,
        Terrain::Village,
        Terrain::Impassable,
    ];

    /// Leaders recruit onto castle hexes connected to their keep
    pub fn is_castle(&self) -> bool {
        matches!(self, Terrain::Castle | Terrain::Keep)
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Terrain::Keep)
    }

    pub fn is_village(&self) -> bool {
        matches!(self, Terrain::Village)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Flat => "flat",
            Terrain::Forest => "forest",
            Terrain::Hills => "hills",
            Terrain::Mountains => "mountains",
            Terrain::ShallowWater => "shallow_water",
            Terrain::DeepWater => "deep_water",
            Terrain::Swamp => "swamp",
            Terrain::Sand => "sand",
            Terrain::Cave => "cave",
            Terrain::Castle => "castle",
            Terrain::Keep => "keep",
            Terrain::Village => "village",
            Terrain::Impassable => "impassable",
        }
    }

    /// Single-character code used by ASCII map layouts
    pub fn symbol(&self) -> char {
        match self {
            Terrain::Flat => '.',
            Terrain::Forest => 'f',
            Terrain::Hills => 'h',
            Terrain::Mountains => 'm',
            Terrain::ShallowWater => '~',
            Terrain::DeepWater => 'W',
            Terrain::Swamp => 's',
            Terrain::Sand => 'd',
            Terrain::Cave => 'c',
            Terrain::Castle => 'C',
            Terrain::Keep => 'K',
            Terrain::Village => 'v',
            Terrain::Impassable => 'X',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Terrain> {
        Terrain::ALL.into_iter().find(|t| t.symbol() == symbol)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Terrain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Terrain::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown terrain '{}'", s))
    }
}

impl TryFrom<String> for Terrain {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Terrain> for String {
    fn from(terrain: Terrain) -> Self {
        terrain.name().to_string()
    }
}
