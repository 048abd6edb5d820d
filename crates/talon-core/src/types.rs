use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One archive event after field extraction, before aggregation.
///
/// String fields absent in the source record stay `None`; they are never
/// backfilled with placeholder values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub id: Option<String>,
    pub event_type: Option<String>,
    /// `actor.login` from the raw record; `None` when the event has no actor.
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub repo_name: Option<String>,
}

/// One output row per distinct actor observed in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub username: String,
    pub is_labeled_bot: bool,
    pub total_events: u64,
    pub distinct_repos_touched: u64,
}

/// Counters for one completed batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub records_read: u64,
    /// Malformed records skipped during extraction.
    pub records_dropped: u64,
    pub actors: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
