//! Day/night schedule

use serde::{Deserialize, Serialize};

/// One step of the day schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub id: String,
    /// Percent damage bonus for lawful units (chaotic units get the opposite)
    pub lawful_bonus: i32,
}

impl TimeOfDay {
    pub fn new(id: &str, lawful_bonus: i32) -> Self {
        Self {
            id: id.to_string(),
            lawful_bonus,
        }
    }
}

/// Standard six-step day
pub fn default_schedule() -> Vec<TimeOfDay> {
    vec![
        TimeOfDay::new("dawn", 0),
        TimeOfDay::new("morning", 25),
        TimeOfDay::new("afternoon", 25),
        TimeOfDay::new("dusk", 0),
        TimeOfDay::new("first_watch", -25),
        TimeOfDay::new("second_watch", -25),
    ]
}

/// Lawful bonus averaged over the schedule, rounded to nearest
pub fn average_lawful_bonus(schedule: &[TimeOfDay]) -> i32 {
    if schedule.is_empty() {
        return 0;
    }
    let sum: i32 = schedule.iter().map(|t| t.lawful_bonus).sum();
    (sum as f64 / schedule.len() as f64).round() as i32
}
