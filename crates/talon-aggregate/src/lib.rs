pub mod counter;
pub mod summary;

pub use counter::ActorStats;
pub use summary::ActivityAggregator;
