//! Per-leader scratch data for one recruitment pass

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::UnitId;
use crate::map::Location;
use crate::recruitment::constants::DEFAULT_LEADER_RATIO;
use crate::units::Unit;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderRecruitmentData {
    pub leader: UnitId,
    pub name: String,
    pub location: Location,
    /// Types this leader can recruit or recall
    pub recruits: BTreeSet<String>,
    pub scores: BTreeMap<String, f64>,
    /// Share of the recruits this leader should get
    pub ratio_score: f64,
    /// Recruits made by this leader during the pass
    pub recruit_count: u32,
    pub in_danger: bool,
}

impl LeaderRecruitmentData {
    pub fn new(leader: &Unit, recruits: BTreeSet<String>) -> Self {
        let scores = recruits.iter().map(|r| (r.clone(), 0.0)).collect();
        Self {
            leader: leader.id,
            name: leader.name.clone(),
            location: leader.location,
            recruits,
            scores,
            ratio_score: DEFAULT_LEADER_RATIO,
            recruit_count: 0,
            in_danger: false,
        }
    }

    /// Scores divided by their sum. Left as they are when the sum is 0.
    pub fn normalized_scores(&self) -> BTreeMap<String, f64> {
        let sum: f64 = self.scores.values().sum();
        self.scores
            .iter()
            .map(|(recruit, score)| {
                let normalized = if sum != 0.0 { score / sum } else { *score };
                (recruit.clone(), normalized)
            })
            .collect()
    }
}
