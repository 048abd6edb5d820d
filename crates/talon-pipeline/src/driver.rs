use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use talon_aggregate::ActivityAggregator;
use talon_core::{ActorSummary, RunReport, TalonError, TalonResult};
use talon_extract::extract_event;
use tracing::{info, warn};
use uuid::Uuid;

/// Supplies the raw records for one batch.
#[async_trait]
pub trait EventSource: Send {
    /// Next raw record, `None` once the batch is drained. A read error is
    /// fatal for the run.
    async fn next_raw(&mut self) -> TalonResult<Option<Value>>;
}

/// Receives the final row set for one batch.
#[async_trait]
pub trait SummarySink: Send + Sync {
    /// Publish the complete summary, replacing any prior output for the
    /// run's partition. Must not leave partial output behind on failure.
    async fn publish(&self, rows: &[ActorSummary]) -> TalonResult<()>;
}

/// A completed run: counters plus the rows that were published.
#[derive(Debug)]
pub struct BatchOutcome {
    pub report: RunReport,
    /// Most active first, as handed to the sink.
    pub rows: Vec<ActorSummary>,
}

/// Drain the source once, aggregate, and publish.
///
/// Malformed records are dropped and counted, never fatal. Source and sink
/// errors fail the run before anything is published.
pub async fn run_batch(
    source: &mut dyn EventSource,
    sink: &dyn SummarySink,
) -> TalonResult<BatchOutcome> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!(run_id = %run_id, "batch run starting");

    let mut aggregator = ActivityAggregator::new();
    let mut records_read: u64 = 0;
    let mut records_dropped: u64 = 0;

    loop {
        // Extract errors from either stage mark one malformed record; the
        // source advances past it, so skipping cannot stall the batch.
        let raw = match source.next_raw().await {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(TalonError::Extract(reason)) => {
                records_read += 1;
                records_dropped += 1;
                warn!(run_id = %run_id, reason = %reason, "dropped unreadable record");
                continue;
            }
            Err(e) => return Err(e),
        };
        records_read += 1;
        match extract_event(&raw) {
            Ok(event) => aggregator.observe(&event),
            Err(TalonError::Extract(reason)) => {
                records_dropped += 1;
                warn!(run_id = %run_id, reason = %reason, "dropped malformed record");
            }
            Err(e) => return Err(e),
        }
    }

    let actors = aggregator.actor_count();
    let rows = aggregator.finish();
    info!(
        run_id = %run_id,
        records = records_read,
        dropped = records_dropped,
        actors,
        "batch aggregated, publishing summary"
    );

    sink.publish(&rows).await?;

    let report = RunReport {
        run_id,
        records_read,
        records_dropped,
        actors,
        started_at,
        finished_at: Utc::now(),
    };
    info!(run_id = %report.run_id, actors = report.actors, "batch run complete");
    Ok(BatchOutcome { report, rows })
}
