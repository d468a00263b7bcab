//! # SprintPulse Registry
//!
//! Process-wide sprint state, shared by both function entry points:
//! - a dedup map (sprint id → details) that makes event scheduling
//!   happen at most once per sprint,
//! - a bounded history of recent sprint summaries for trend comparison.
//!
//! All state is in-memory with no persistence guarantee across restarts;
//! a restart simply loses recent dedup/history state. Callers share the
//! registry behind `Arc<tokio::sync::Mutex<..>>` so the
//! check-then-insert and evict-then-insert sequences stay atomic.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use sprintpulse_core::types::{SprintDetails, SprintSummary, parse_timestamp};

/// At most this many sprint summaries are retained for trend comparison.
pub const SUMMARY_HISTORY_CAP: usize = 3;

/// In-process sprint registry. No operation here can fail.
pub struct SprintRegistry {
    sprints: HashMap<String, SprintDetails>,
    summaries: HashMap<String, SprintSummary>,
    retention: Duration,
}

impl SprintRegistry {
    /// Create a registry that keeps dedup entries for `retention_hours`
    /// past each sprint's end date.
    pub fn new(retention_hours: u64) -> Self {
        Self {
            sprints: HashMap::new(),
            summaries: HashMap::new(),
            retention: Duration::hours(retention_hours as i64),
        }
    }

    /// Whether this sprint has already been observed.
    pub fn has_seen(&self, sprint_id: &str) -> bool {
        self.sprints.contains_key(sprint_id)
    }

    /// Record a sprint sighting. No-op if the sprint is already present.
    pub fn record_seen(&mut self, details: SprintDetails) {
        self.sprints.entry(details.id.clone()).or_insert(details);
    }

    /// Atomic check-then-insert. Returns `true` if this was the first
    /// sighting — the sole signal that event scheduling should run.
    pub fn record_if_unseen(&mut self, details: SprintDetails) -> bool {
        if self.has_seen(&details.id) {
            return false;
        }
        self.record_seen(details);
        true
    }

    /// Remove every dedup entry whose sprint ended more than the
    /// retention window before `now`. Entries with unparsable end dates
    /// are kept. Returns the number of entries removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let before = self.sprints.len();
        self.sprints.retain(|sprint_id, sprint| {
            match parse_timestamp(&sprint.end_date) {
                Some(end) if end < cutoff => {
                    tracing::info!("🧹 Pruned sprint registry entry: {sprint_id}");
                    false
                }
                _ => true,
            }
        });
        before - self.sprints.len()
    }

    /// Store a sprint summary. When the history is at capacity and this
    /// sprint is new to it, the summary with the earliest sprint end
    /// date is evicted first — eviction order is by end date, not
    /// insertion order.
    pub fn save_summary(&mut self, summary: SprintSummary) {
        if !self.summaries.contains_key(&summary.sprint_id)
            && self.summaries.len() >= SUMMARY_HISTORY_CAP
        {
            let oldest = self
                .summaries
                .values()
                .min_by_key(|s| (summary_end(s), s.sprint_id.clone()))
                .map(|s| s.sprint_id.clone());
            if let Some(id) = oldest {
                tracing::info!("🧹 Evicted oldest summary from history: {id}");
                self.summaries.remove(&id);
            }
        }
        self.summaries.insert(summary.sprint_id.clone(), summary);
    }

    /// All retained summaries. Order is not meaningful; consumers treat
    /// this as a comparison set.
    pub fn recent_summaries(&self) -> Vec<SprintSummary> {
        self.summaries.values().cloned().collect()
    }

    /// Number of live dedup entries.
    pub fn sprint_count(&self) -> usize {
        self.sprints.len()
    }

    /// Number of retained summaries.
    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }
}

/// End date used for eviction ordering. Summaries with unparsable end
/// dates sort first, so they are the first to go.
fn summary_end(summary: &SprintSummary) -> DateTime<Utc> {
    parse_timestamp(&summary.end_date).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Background maintenance loop: prunes expired dedup entries on a fixed
/// interval, independent of request handling. Spawn with `tokio::spawn`;
/// runs until the process exits.
pub async fn run_pruner(registry: Arc<Mutex<SprintRegistry>>, interval_secs: u64) {
    tracing::info!("⏰ Registry pruner started (every {interval_secs}s)");
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    // The first tick fires immediately; harmless against a fresh registry.
    loop {
        interval.tick().await;
        let removed = {
            let mut reg = registry.lock().await;
            reg.prune_expired(Utc::now())
        };
        if removed > 0 {
            tracing::info!("🧹 Pruned {removed} expired sprint entries");
        }
    }
}
