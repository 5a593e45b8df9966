pub mod config;
pub mod error;
pub mod types;

pub use config::{CombatCachePolicy, RecruitmentAspects, SaveGoldConfig};
pub use error::{RecruitError, Result};
pub use types::{Gold, SideId, TeamId, Turn, UnitId};
