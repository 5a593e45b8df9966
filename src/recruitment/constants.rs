//! Tuning constants of the recruitment AI

pub use crate::combat::{COMBAT_CACHE_TOLERANCE, POISON_AMOUNT};
pub use crate::pathfinding::PHANTOM_UNIT_THRESHOLD;

/// Returned by `evaluate()` when there is nothing to do
pub const BAD_SCORE: f64 = 0.0;

/// Below this many visible enemy units, enemy recruit lists count too
pub const UNIT_THRESHOLD: usize = 5;

/// Added to a scout's desirability while scouts are wanted
pub const SCOUT_BONUS: f64 = 1000.0;

/// Added to the score of every `recruitment_more` match
pub const MORE_BONUS: f64 = 25.0;

/// Ratio score of a leader with enemies in reach
pub const LEADER_IN_DANGER_RATIO: f64 = 50.0;

/// Ratio score of any other leader
pub const DEFAULT_LEADER_RATIO: f64 = 1.0;

/// Unit ratio reported when no enemy is left but we have units
pub const NO_ENEMY_RATIO: f64 = 999.0;

pub const SAVE_GOLD_FORECAST_TURNS: u32 = 5;
pub const BASE_INCOME: f64 = 2.0;
pub const VILLAGE_INCOME: f64 = 2.0;
/// Upkeep each village pays for
pub const VILLAGE_SUPPORT: f64 = 1.0;

/// `villages_per_scout` is tuned for two sides
pub const VILLAGE_PER_SCOUT_MULTIPLICATOR: f64 = 2.0;

/// Quota of jobs that do not name a number
pub const DEFAULT_JOB_NUMBER: i32 = 99_999;

/// Lower end of the rescaled combat scores
pub const MIN_DIVERSITY: f64 = 0.0001;
