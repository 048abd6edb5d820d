pub mod error;
pub mod types;

pub use error::{TalonError, TalonResult};
pub use types::{ActorSummary, NormalizedEvent, RunReport};
