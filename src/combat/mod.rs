//! Combat outcome model and combat value estimation

pub mod cache;
pub mod estimator;
pub mod simulation;

pub use cache::{CombatCache, COMBAT_CACHE_TOLERANCE};
pub use estimator::{average_defense, simulate_attack, CombatContext, CombatEstimator, ONE_SIDED_VALUE};
pub use simulation::{better_combat, simulate, BattleOutcome, Combatant, CombatantOutcome, POISON_AMOUNT};
