//! Sides: gold, recruit list and recall list

use serde::{Deserialize, Serialize};

use crate::core::types::{Gold, SideId, TeamId};
use crate::units::Unit;

/// Default price of recalling a unit
pub const DEFAULT_RECALL_COST: Gold = 20;

/// One player or AI side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Side {
    pub id: SideId,
    /// Sides on the same team are allies
    pub team: TeamId,
    pub gold: Gold,
    pub recall_cost: Gold,
    /// Units from earlier scenarios, off the map
    pub recall_list: Vec<Unit>,
    recruits: Vec<String>,
    recruits_version: u64,
}

impl Side {
    pub fn new(id: SideId, team: TeamId, gold: Gold) -> Self {
        Self {
            id,
            team,
            gold,
            recall_cost: DEFAULT_RECALL_COST,
            recall_list: Vec::new(),
            recruits: Vec::new(),
            recruits_version: 0,
        }
    }

    pub fn with_recruits<S: AsRef<str>>(mut self, recruits: &[S]) -> Self {
        self.set_recruits(recruits.iter().map(|r| r.as_ref().to_string()).collect());
        self
    }

    /// Team-wide recruit list
    pub fn recruits(&self) -> &[String] {
        &self.recruits
    }

    pub fn set_recruits(&mut self, recruits: Vec<String>) {
        self.recruits = recruits;
        self.recruits_version += 1;
    }

    pub fn add_recruit(&mut self, type_id: &str) {
        if !self.recruits.iter().any(|r| r == type_id) {
            self.recruits.push(type_id.to_string());
            self.recruits_version += 1;
        }
    }

    pub fn remove_recruit(&mut self, type_id: &str) {
        let before = self.recruits.len();
        self.recruits.retain(|r| r != type_id);
        if self.recruits.len() != before {
            self.recruits_version += 1;
        }
    }

    /// Bumped on every change to the recruit list
    pub fn recruits_version(&self) -> u64 {
        self.recruits_version
    }

    pub fn is_enemy(&self, other: &Side) -> bool {
        self.team != other.team
    }
}
