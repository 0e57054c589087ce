//! Path completion statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion record for one path name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRecord {
    pub completions: u64,
    /// Fewest ticks from load to completion
    pub best_ticks: u64,
    pub total_ticks: u64,
    pub last_completed_at: DateTime<Utc>,
}

impl PathRecord {
    pub fn mean_ticks(&self) -> f64 {
        if self.completions == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.completions as f64
    }
}

/// Completion statistics across all paths of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub paths_completed: u64,
    pub per_path: BTreeMap<String, PathRecord>,
}

impl CompletionStats {
    /// Record a completion of `name` that took `ticks` ticks
    pub fn record(&mut self, name: &str, ticks: u64, at: DateTime<Utc>) {
        self.paths_completed += 1;
        self.per_path
            .entry(name.to_string())
            .and_modify(|record| {
                record.completions += 1;
                record.best_ticks = record.best_ticks.min(ticks);
                record.total_ticks += ticks;
                record.last_completed_at = at;
            })
            .or_insert(PathRecord {
                completions: 1,
                best_ticks: ticks,
                total_ticks: ticks,
                last_completed_at: at,
            });
    }

    pub fn get(&self, name: &str) -> Option<&PathRecord> {
        self.per_path.get(name)
    }
}
