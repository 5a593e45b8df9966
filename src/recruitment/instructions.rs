//! Recruitment instructions: jobs and limits
//!
//! Type lists are comma separated. Each entry matches a unit type id, a usage
//! or a level. An empty list matches everything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::recruitment::constants::DEFAULT_JOB_NUMBER;
use crate::units::UnitTypeRegistry;

fn split_types(types: &str) -> Vec<&str> {
    types
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn default_number() -> i32 {
    DEFAULT_JOB_NUMBER
}

fn default_importance() -> i32 {
    1
}

fn default_blocker() -> bool {
    true
}

/// Does the registered type `recruit` match `pattern`? Unknown types never match.
pub fn recruit_matches_type(registry: &UnitTypeRegistry, recruit: &str, pattern: &str) -> bool {
    registry
        .find(recruit)
        .is_some_and(|unit_type| unit_type.matches_pattern(pattern))
}

/// Any pattern matches, or there are none
pub fn recruit_matches_types(registry: &UnitTypeRegistry, recruit: &str, patterns: &[&str]) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| recruit_matches_type(registry, recruit, p))
}

/// One `[recruit]` job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitJob {
    #[serde(rename = "type", default)]
    pub types: String,
    #[serde(default)]
    pub leader_id: Option<String>,
    #[serde(default = "default_number")]
    pub number: i32,
    #[serde(default = "default_importance")]
    pub importance: i32,
    /// `number` is a headcount of matching units rather than a quota
    #[serde(default)]
    pub total: bool,
    #[serde(default = "default_blocker")]
    pub blocker: bool,
    /// Pick one entry of `types` at random each time
    #[serde(default)]
    pub pattern: bool,
    #[serde(skip)]
    cleared: bool,
}

impl Default for RecruitJob {
    fn default() -> Self {
        Self {
            types: String::new(),
            leader_id: None,
            number: default_number(),
            importance: default_importance(),
            total: false,
            blocker: default_blocker(),
            pattern: false,
            cleared: false,
        }
    }
}

impl RecruitJob {
    pub fn new(types: &str) -> Self {
        Self {
            types: types.into(),
            ..Self::default()
        }
    }

    pub fn with_number(mut self, number: i32) -> Self {
        self.number = number;
        self
    }

    pub fn with_importance(mut self, importance: i32) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_blocker(mut self, blocker: bool) -> Self {
        self.blocker = blocker;
        self
    }

    pub fn with_leader(mut self, leader_id: &str) -> Self {
        self.leader_id = Some(leader_id.into());
        self
    }

    /// Job built from a `recruitment_pattern` aspect
    pub fn from_pattern(pattern: &[String]) -> Self {
        Self {
            types: pattern.join(","),
            pattern: true,
            ..Self::default()
        }
    }

    pub fn type_patterns(&self) -> Vec<&str> {
        split_types(&self.types)
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Take the job out of consideration for the rest of the turn
    pub fn clear(&mut self) {
        self.cleared = true;
    }

    pub fn matches_recruit(&self, registry: &UnitTypeRegistry, recruit: &str) -> bool {
        recruit_matches_types(registry, recruit, &self.type_patterns())
    }

    /// Is the job open to the leader called `leader_name`?
    pub fn matches_leader(&self, leader_name: &str) -> bool {
        match self.leader_id.as_deref() {
            None | Some("") => true,
            Some(id) => leader_name == id,
        }
    }

    /// Units still to recruit. `total` jobs subtract the matching headcount.
    pub fn remaining(&self, registry: &UnitTypeRegistry, own_units: &BTreeMap<String, u32>) -> i32 {
        if !self.total {
            return self.number;
        }
        let patterns = self.type_patterns();
        let existing: u32 = own_units
            .iter()
            .filter(|(type_id, _)| recruit_matches_types(registry, type_id, &patterns))
            .map(|(_, count)| *count)
            .sum();
        self.number - existing as i32
    }
}

/// One `[limit]`: at most `max` own units matching `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitLimit {
    #[serde(rename = "type", default)]
    pub types: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub max: u32,
}

impl RecruitLimit {
    pub fn type_patterns(&self) -> Vec<&str> {
        split_types(&self.types)
    }
}

/// Jobs and limits of one side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecruitmentInstructions {
    pub recruit: Vec<RecruitJob>,
    pub limit: Vec<RecruitLimit>,
}

impl Default for RecruitmentInstructions {
    /// A single catch-all job of the lowest importance
    fn default() -> Self {
        Self {
            recruit: vec![RecruitJob {
                importance: 0,
                ..RecruitJob::default()
            }],
            limit: Vec::new(),
        }
    }
}

impl RecruitmentInstructions {
    /// Would recruiting one more `recruit` stay within every limit?
    pub fn limit_ok(&self, registry: &UnitTypeRegistry, recruit: &str, own_units: &BTreeMap<String, u32>) -> bool {
        for limit in &self.limit {
            let patterns = limit.type_patterns();
            if !recruit_matches_types(registry, recruit, &patterns) {
                continue;
            }
            let count: u32 = own_units
                .iter()
                .filter(|(type_id, _)| recruit_matches_types(registry, type_id, &patterns))
                .map(|(_, count)| *count)
                .sum();
            if count >= limit.max {
                return false;
            }
        }
        true
    }

    /// Index of the job to work on next.
    ///
    /// Highest importance wins; ties go to the smallest remaining number, then
    /// to the job declared first. Cleared, empty and fulfilled jobs are skipped.
    pub fn most_important_job(&self, registry: &UnitTypeRegistry, own_units: &BTreeMap<String, u32>) -> Option<usize> {
        let mut best: Option<(usize, i32, i32)> = None;
        for (index, job) in self.recruit.iter().enumerate() {
            if job.is_cleared() {
                continue;
            }
            if job.pattern && job.type_patterns().is_empty() {
                continue;
            }
            let remaining = job.remaining(registry, own_units);
            if remaining <= 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, importance, number)) => {
                    job.importance > importance || (job.importance == importance && remaining < number)
                }
            };
            if better {
                best = Some((index, job.importance, remaining));
            }
        }
        best.map(|(index, _, _)| index)
    }

    pub fn active_jobs(&self) -> usize {
        self.recruit.iter().filter(|j| !j.is_cleared()).count()
    }
}
