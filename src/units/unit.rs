//! Unit instances on the board or on a recall list

use serde::{Deserialize, Serialize};

use crate::core::types::{Gold, SideId, UnitId};
use crate::map::Location;
use crate::units::unit_type::{matches_type_pattern, UnitType};

/// A concrete unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Name used by `leader_id` job restrictions
    pub name: String,
    pub type_id: String,
    pub side: SideId,
    pub location: Location,
    pub hitpoints: u32,
    pub max_hitpoints: u32,
    pub experience: u32,
    pub max_experience: u32,
    /// Movement allowance per turn
    pub moves: u32,
    pub cost: Gold,
    pub level: u32,
    pub usage: String,
    pub can_recruit: bool,
    /// Petrified and similar; ignored by every analysis
    pub incapacitated: bool,
    /// Types this unit may recruit on top of its side's list
    pub extra_recruits: Vec<String>,
    /// Type patterns this leader may recall; empty means any
    pub recall_filter: Vec<String>,
}

impl Unit {
    /// Fresh full-health unit of the given type
    pub fn from_type(id: UnitId, unit_type: &UnitType, side: SideId, location: Location) -> Self {
        Self {
            id,
            name: format!("{}-{}", unit_type.id, id.0),
            type_id: unit_type.id.clone(),
            side,
            location,
            hitpoints: unit_type.hitpoints,
            max_hitpoints: unit_type.hitpoints,
            experience: 0,
            max_experience: unit_type.experience.max(1),
            moves: unit_type.moves,
            cost: unit_type.cost,
            level: unit_type.level,
            usage: unit_type.usage.clone(),
            can_recruit: false,
            incapacitated: false,
            extra_recruits: Vec::new(),
            recall_filter: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Turn this unit into a leader
    pub fn as_leader(mut self) -> Self {
        self.can_recruit = true;
        self
    }

    pub fn is_leader(&self) -> bool {
        self.can_recruit
    }

    /// Remaining health in [0, 1]
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hitpoints == 0 {
            return 0.0;
        }
        self.hitpoints as f64 / self.max_hitpoints as f64
    }

    /// Progress towards the next level in [0, 1]
    pub fn xp_fraction(&self) -> f64 {
        if self.max_experience == 0 {
            return 0.0;
        }
        (self.experience as f64 / self.max_experience as f64).min(1.0)
    }

    pub fn matches_pattern(&self, pattern: &str) -> bool {
        matches_type_pattern(pattern, &self.type_id, &self.usage, self.level)
    }

    /// Does this leader's recall filter admit `unit`?
    pub fn can_recall(&self, unit: &Unit) -> bool {
        self.recall_filter.is_empty() || self.recall_filter.iter().any(|p| unit.matches_pattern(p))
    }

    /// Counts towards army strength and cost maps
    pub fn is_fighting_unit(&self) -> bool {
        !self.incapacitated && self.moves > 0 && !self.can_recruit
    }
}
