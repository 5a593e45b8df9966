//! Game board the AI reads from and acts on

pub mod actions;
pub mod game_board;
pub mod side;
pub mod time_of_day;

pub use actions::{ActionExecutor, ActionOutcome, BoardActions};
pub use game_board::GameBoard;
pub use side::{Side, DEFAULT_RECALL_COST};
pub use time_of_day::{average_lawful_bonus, default_schedule, TimeOfDay};
