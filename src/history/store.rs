//! History store interface and in-memory implementation
//!
//! The core treats the store as an append-only log of finalized outcomes plus
//! a point lookup for current rating state. Persisting an outcome together
//! with its rating deltas is a single atomic write from the core's
//! perspective; the in-memory implementation holds both locks for the
//! duration of the append.

use crate::error::EngineError;
use crate::rating::model::RatingDeltaSet;
use crate::types::{CompetitorId, MatchOutcome, RatingState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Stored rating state for a competitor with bookkeeping metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub competitor_id: CompetitorId,
    pub state: RatingState,
    pub games_played: u64,
    pub last_updated: DateTime<Utc>,
}

/// A finalized match with the delta sets it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub outcome: MatchOutcome,
    pub deltas: Vec<RatingDeltaSet>,
    pub recorded_at: DateTime<Utc>,
}

/// Trait for the external history collaborator
pub trait HistoryStore: Send + Sync {
    /// All completed outcomes, oldest first (seeds the partnership index)
    fn completed_outcomes(&self) -> crate::error::Result<Vec<MatchOutcome>>;

    /// Persist a finalized outcome and its rating deltas as one atomic write
    fn append_outcome(
        &self,
        outcome: MatchOutcome,
        deltas: Vec<RatingDeltaSet>,
    ) -> crate::error::Result<()>;

    /// Point lookup of a competitor's current rating state
    fn current_state(&self, competitor_id: CompetitorId)
        -> crate::error::Result<Option<StateEntry>>;

    /// Number of finalized matches in the log
    fn match_count(&self) -> crate::error::Result<usize>;
}

/// In-memory history store implementation
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<MatchRecord>>,
    states: RwLock<HashMap<CompetitorId, StateEntry>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset rating states (for tests and seeding)
    pub fn preset_states(&self, entries: Vec<StateEntry>) -> crate::error::Result<()> {
        let mut states = self.states.write().map_err(|_| EngineError::InternalError {
            message: "Failed to acquire states write lock".to_string(),
        })?;

        for entry in entries {
            states.insert(entry.competitor_id, entry);
        }
        Ok(())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn completed_outcomes(&self) -> crate::error::Result<Vec<MatchOutcome>> {
        let records = self.records.read().map_err(|_| EngineError::InternalError {
            message: "Failed to acquire records read lock".to_string(),
        })?;

        Ok(records.iter().map(|r| r.outcome.clone()).collect())
    }

    fn append_outcome(
        &self,
        outcome: MatchOutcome,
        deltas: Vec<RatingDeltaSet>,
    ) -> crate::error::Result<()> {
        // Hold both locks for the duration: the append is atomic
        let mut records = self.records.write().map_err(|_| EngineError::InternalError {
            message: "Failed to acquire records write lock".to_string(),
        })?;
        let mut states = self.states.write().map_err(|_| EngineError::InternalError {
            message: "Failed to acquire states write lock".to_string(),
        })?;

        let now = Utc::now();
        for delta_set in &deltas {
            for delta in &delta_set.deltas {
                let entry = states.entry(delta.competitor_id).or_insert_with(|| StateEntry {
                    competitor_id: delta.competitor_id,
                    state: delta.before,
                    games_played: 0,
                    last_updated: now,
                });
                entry.state = delta.after;
                entry.last_updated = now;
            }
        }

        // One game per finalized match, regardless of how many variants ran
        for member in outcome.competitors() {
            if let Some(entry) = states.get_mut(&member.id) {
                entry.games_played += 1;
            }
        }

        records.push(MatchRecord {
            outcome,
            deltas,
            recorded_at: now,
        });

        Ok(())
    }

    fn current_state(
        &self,
        competitor_id: CompetitorId,
    ) -> crate::error::Result<Option<StateEntry>> {
        let states = self.states.read().map_err(|_| EngineError::InternalError {
            message: "Failed to acquire states read lock".to_string(),
        })?;

        Ok(states.get(&competitor_id).cloned())
    }

    fn match_count(&self) -> crate::error::Result<usize> {
        let records = self.records.read().map_err(|_| EngineError::InternalError {
            message: "Failed to acquire records read lock".to_string(),
        })?;

        Ok(records.len())
    }
}
