//! Keep Recruiter - hex pathfinding and recruitment AI for turn-based strategy games

pub mod board;
pub mod combat;
pub mod core;
pub mod map;
pub mod pathfinding;
pub mod recruitment;
pub mod units;
