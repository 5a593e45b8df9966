//! Unit types: the static stats a unit is built from
//!
//! Movement costs and defense are per terrain. A terrain missing from the
//! movement table is impassable for the type; a terrain missing from the
//! defense table gives no defense at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::Gold;
use crate::map::Terrain;
use crate::units::attack::{Attack, DamageType};

/// Movement costs at or above this are impassable
pub const IMPASSABLE: u32 = 99;

/// How time of day affects a unit's damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Lawful,
    #[default]
    Neutral,
    Chaotic,
    Liminal,
}

impl Alignment {
    /// Percent damage bonus for a given lawful bonus
    pub fn damage_bonus(&self, lawful_bonus: i32) -> i32 {
        match self {
            Alignment::Lawful => lawful_bonus,
            Alignment::Neutral => 0,
            Alignment::Chaotic => -lawful_bonus,
            Alignment::Liminal => -lawful_bonus.abs(),
        }
    }
}

/// Shared matcher for recruit jobs, limits and recall filters
pub fn matches_type_pattern(pattern: &str, id: &str, usage: &str, level: u32) -> bool {
    pattern == id || pattern == usage || pattern == level.to_string()
}

fn default_experience() -> u32 {
    100
}

/// Static definition of a unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub cost: Gold,
    pub hitpoints: u32,
    #[serde(default)]
    pub level: u32,
    /// Experience needed to advance
    #[serde(default = "default_experience")]
    pub experience: u32,
    #[serde(default)]
    pub alignment: Alignment,
    pub moves: u32,
    /// AI role hint ("fighter", "archer", "scout", ...)
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub movement_costs: BTreeMap<Terrain, u32>,
    /// Percent chance to evade a strike, per terrain
    #[serde(default)]
    pub defense: BTreeMap<Terrain, u32>,
    /// Percent damage reduction, per damage type (negative = weakness)
    #[serde(default)]
    pub resistance: BTreeMap<DamageType, i32>,
    #[serde(default)]
    pub attacks: Vec<Attack>,
    #[serde(default)]
    pub advances_to: Vec<String>,
}

impl UnitType {
    pub fn new(id: &str, cost: Gold, hitpoints: u32, moves: u32) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            cost,
            hitpoints,
            level: 1,
            experience: default_experience(),
            alignment: Alignment::Neutral,
            moves,
            usage: String::new(),
            movement_costs: BTreeMap::new(),
            defense: BTreeMap::new(),
            resistance: BTreeMap::new(),
            attacks: Vec::new(),
            advances_to: Vec::new(),
        }
    }

    /// Movement cost of entering a hex, `None` if impassable
    pub fn movement_cost(&self, terrain: Terrain) -> Option<u32> {
        self.movement_costs
            .get(&terrain)
            .copied()
            .filter(|cost| *cost < IMPASSABLE)
    }

    /// Percent chance to evade on the given terrain
    pub fn defense_on(&self, terrain: Terrain) -> u32 {
        self.defense.get(&terrain).copied().unwrap_or(0).min(100)
    }

    pub fn resistance_to(&self, damage_type: DamageType) -> i32 {
        self.resistance.get(&damage_type).copied().unwrap_or(0)
    }

    pub fn is_scout(&self) -> bool {
        self.usage == "scout"
    }

    /// A pattern names a type id, a usage or a level
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        matches_type_pattern(pattern, &self.id, &self.usage, self.level)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
