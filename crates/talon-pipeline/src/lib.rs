pub mod driver;

pub use driver::{run_batch, BatchOutcome, EventSource, SummarySink};
