//! Route search and reachability on the hex grid

pub mod astar;
pub mod calculator;
pub mod cost_map;
pub mod flood;

pub use astar::{CostCalculator, Route, SearchContext, SearchStats, NO_PATH_VALUE};
pub use calculator::MoveCostCalculator;
pub use cost_map::{build_cost_map, CostMap, PHANTOM_UNIT_THRESHOLD, UNREACHABLE};
pub use flood::{flood, ReachMap};
