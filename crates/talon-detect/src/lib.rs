pub mod heuristic;

pub use heuristic::{is_bot, BOT_NAME_PATTERN};
