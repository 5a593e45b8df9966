//! Recruitment AI
//!
//! Decides which units a side recruits or recalls each turn. Candidate types
//! are scored by simulated combat against the enemy army on the terrain that
//! matters, then handed out to leaders and jobs until the gold or the castle
//! space runs out.

pub mod constants;
pub mod engine;
pub mod important_hexes;
pub mod instructions;
pub mod leader_data;
pub mod scoring;
pub mod state;

pub use engine::{
    average_advancement_cost, best_recall, cheapest_option_cost, recall_worth, PassEnd, PassReport, Recruitment,
    RecruitmentAction,
};
pub use important_hexes::{enemy_cost_map, find_important_hexes, ImportantHexes};
pub use instructions::{RecruitJob, RecruitLimit, RecruitmentInstructions};
pub use leader_data::LeaderRecruitmentData;
pub use state::{estimated_income, unit_ratio, RecruitmentState};
