use crate::counter::ActorStats;
use std::collections::HashMap;
use talon_core::{ActorSummary, NormalizedEvent};

/// Partitions events by username and folds each partition into
/// [`ActorStats`]. Events without a username belong to no partition and are
/// discarded here.
#[derive(Debug, Default)]
pub struct ActivityAggregator {
    actors: HashMap<String, ActorStats>,
}

impl ActivityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &NormalizedEvent) {
        let Some(username) = &event.username else {
            return;
        };
        self.actors.entry(username.clone()).or_default().observe(event);
    }

    /// Recombine a partial aggregate built on another shard of the batch.
    pub fn merge(&mut self, other: ActivityAggregator) {
        for (username, stats) in other.actors {
            self.actors.entry(username).or_default().merge(stats);
        }
    }

    pub fn actor_count(&self) -> u64 {
        self.actors.len() as u64
    }

    /// Emit one row per actor, most active first. Tie order among equal
    /// event counts is unspecified.
    pub fn finish(self) -> Vec<ActorSummary> {
        let mut rows: Vec<ActorSummary> = self
            .actors
            .into_iter()
            .map(|(username, stats)| ActorSummary {
                username,
                is_labeled_bot: stats.labeled_bot(),
                total_events: stats.total_events(),
                distinct_repos_touched: stats.distinct_repos(),
            })
            .collect();
        rows.sort_by(|a, b| b.total_events.cmp(&a.total_events));
        rows
    }
}
