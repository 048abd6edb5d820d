use std::collections::HashSet;
use talon_core::NormalizedEvent;
use talon_detect::is_bot;

/// Running per-actor counts for one username partition.
///
/// All three fields combine associatively and commutatively (sum, set
/// union, OR), so partial accumulators built on separate shards merge into
/// the same result the sequential fold produces.
#[derive(Debug, Clone, Default)]
pub struct ActorStats {
    total_events: u64,
    repos: HashSet<String>,
    labeled_bot: bool,
}

impl ActorStats {
    /// Fold one event into the partition.
    ///
    /// `is_labeled_bot` is a running OR over per-record verdicts rather
    /// than a single evaluation of the shared username, so a partition
    /// with any flagged record stays flagged. Events without a repo name
    /// count toward `total_events` but not toward the distinct-repo set.
    pub fn observe(&mut self, event: &NormalizedEvent) {
        self.total_events += 1;
        self.labeled_bot |= is_bot(event.username.as_deref());
        if let Some(repo) = &event.repo_name {
            self.repos.insert(repo.clone());
        }
    }

    pub fn merge(&mut self, other: ActorStats) {
        self.total_events += other.total_events;
        self.labeled_bot |= other.labeled_bot;
        self.repos.extend(other.repos);
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn distinct_repos(&self) -> u64 {
        self.repos.len() as u64
    }

    pub fn labeled_bot(&self) -> bool {
        self.labeled_bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(username: &str, repo: Option<&str>) -> NormalizedEvent {
        NormalizedEvent {
            id: Some("1".to_string()),
            event_type: Some("PushEvent".to_string()),
            username: Some(username.to_string()),
            created_at: Utc::now(),
            repo_name: repo.map(str::to_string),
        }
    }

    #[test]
    fn counts_events_and_distinct_repos() {
        let mut stats = ActorStats::default();
        stats.observe(&event("alice", Some("alice/a")));
        stats.observe(&event("alice", Some("alice/b")));
        stats.observe(&event("alice", Some("alice/a")));

        assert_eq!(stats.total_events(), 3);
        assert_eq!(stats.distinct_repos(), 2);
        assert!(!stats.labeled_bot());
    }

    #[test]
    fn missing_repo_counts_event_only() {
        let mut stats = ActorStats::default();
        stats.observe(&event("alice", None));
        stats.observe(&event("alice", Some("alice/a")));

        assert_eq!(stats.total_events(), 2);
        assert_eq!(stats.distinct_repos(), 1);
    }

    #[test]
    fn bot_flag_sticks_once_set() {
        let mut stats = ActorStats::default();
        stats.observe(&event("cleanupbot", Some("org/infra")));
        assert!(stats.labeled_bot());
        stats.observe(&event("cleanupbot", Some("org/infra")));
        assert!(stats.labeled_bot());
    }

    #[test]
    fn merge_matches_sequential_fold() {
        let events = [
            event("alice", Some("alice/a")),
            event("alice", Some("alice/b")),
            event("alice", Some("alice/a")),
            event("alice", None),
        ];

        let mut sequential = ActorStats::default();
        for e in &events {
            sequential.observe(e);
        }

        let mut left = ActorStats::default();
        let mut right = ActorStats::default();
        left.observe(&events[0]);
        left.observe(&events[1]);
        right.observe(&events[2]);
        right.observe(&events[3]);
        left.merge(right);

        assert_eq!(left.total_events(), sequential.total_events());
        assert_eq!(left.distinct_repos(), sequential.distinct_repos());
        assert_eq!(left.labeled_bot(), sequential.labeled_bot());
    }
}
