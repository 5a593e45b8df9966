//! Recruitment aspects: the AI configuration read at the start of every pass
//!
//! Aspects are plain data loaded from TOML. Every field has a default that
//! reproduces the stock recruitment AI, so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{RecruitError, Result};
use crate::recruitment::instructions::RecruitmentInstructions;

/// Gold-saving thresholds for the recruitment state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveGoldConfig {
    /// First turn on which SAVE_GOLD actually stops recruiting (0 = never)
    pub active: u32,
    /// Unit ratio above which NORMAL switches to SAVE_GOLD
    pub begin: f64,
    /// Unit ratio below which SAVE_GOLD switches back to NORMAL
    pub end: f64,
    /// Gold amount forcing SPEND_ALL_GOLD (non-positive disables)
    pub spend_all_gold: f64,
    /// Start saving even when the income forecast is negative
    pub save_on_negative_income: bool,
}

impl Default for SaveGoldConfig {
    fn default() -> Self {
        Self {
            active: 2,
            begin: 1.5,
            end: 1.1,
            spend_all_gold: -1.0,
            save_on_negative_income: false,
        }
    }
}

/// How long combat-value cache entries live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CombatCachePolicy {
    /// Cleared at the start of every recruitment pass
    #[default]
    PerPass,
    /// Never cleared; grows for the whole session
    Persistent,
    /// Never cleared, but each type pair keeps at most this many entries
    BoundedPerPair(usize),
}

/// All aspects consumed by the recruitment engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecruitmentAspects {
    /// Jobs and limits
    pub recruitment_instructions: RecruitmentInstructions,
    /// Usages/types to pick from at random (turned into a pattern job)
    pub recruitment_pattern: Vec<String>,
    pub recruitment_save_gold: SaveGoldConfig,
    /// Upper bound of the uniform noise added to every score
    pub recruitment_randomness: f64,
    /// How far below the best score a recruit may fall before it scores 0
    pub recruitment_diversity: f64,
    /// Types/usages that get a flat score bonus
    pub recruitment_more: Vec<String>,
    /// Neutral villages per wanted scout in a two-side game (0 disables scouts)
    pub villages_per_scout: u32,
    /// Exponent applied to each matchup score before summing
    pub combat_score_power: f64,
    /// Shift of the contested border towards the enemy (positive = offensive)
    pub offensive_shift: f64,
    /// Max difference in average arrival cost for a hex to count as contested
    pub border_thickness: f64,
    /// Score returned by `evaluate()` when recruiting is possible
    pub score: f64,
    pub combat_cache: CombatCachePolicy,
}

impl Default for RecruitmentAspects {
    fn default() -> Self {
        Self {
            recruitment_instructions: RecruitmentInstructions::default(),
            recruitment_pattern: Vec::new(),
            recruitment_save_gold: SaveGoldConfig::default(),
            recruitment_randomness: 50.0,
            recruitment_diversity: 2.0,
            recruitment_more: Vec::new(),
            villages_per_scout: 4,
            combat_score_power: 2.0,
            offensive_shift: 0.0,
            border_thickness: 2.0,
            score: 180_000.0,
            combat_cache: CombatCachePolicy::PerPass,
        }
    }
}

impl RecruitmentAspects {
    /// Parse aspects from a TOML document and validate them
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let aspects: RecruitmentAspects = toml::from_str(contents)?;
        aspects.validate()?;
        Ok(aspects)
    }

    /// Load aspects from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let save_gold = &self.recruitment_save_gold;
        if save_gold.end > save_gold.begin {
            return Err(RecruitError::InvalidConfig(format!(
                "recruitment_save_gold.end ({}) should be <= begin ({})",
                save_gold.end, save_gold.begin
            )));
        }

        if self.recruitment_randomness < 0.0 {
            return Err(RecruitError::InvalidConfig(
                "recruitment_randomness must not be negative".into(),
            ));
        }

        if self.combat_score_power <= 0.0 {
            return Err(RecruitError::InvalidConfig(format!(
                "combat_score_power ({}) must be positive",
                self.combat_score_power
            )));
        }

        if self.border_thickness < 0.0 {
            return Err(RecruitError::InvalidConfig(
                "border_thickness must not be negative".into(),
            ));
        }

        if let CombatCachePolicy::BoundedPerPair(0) = self.combat_cache {
            return Err(RecruitError::InvalidConfig(
                "combat_cache bound must be at least 1".into(),
            ));
        }

        for limit in &self.recruitment_instructions.limit {
            if limit.type_patterns().is_empty() && limit.id.is_none() {
                return Err(RecruitError::InvalidConfig(
                    "a [limit] needs a type or an id".into(),
                ));
            }
        }

        Ok(())
    }
}
