use bevy::prelude::Resource;
use rating_math::{Rating, Roller};
use serde::Serialize;
use thiserror::Error;

use crate::records::{CheckResult, RatingStore, RecordId};

/// Per-record problem found while computing or replaying a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum CycleError {
    #[error("record does not exist")]
    UnknownRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub record: RecordId,
    pub error: CycleError,
}

/// A single deferred change to a record.
#[derive(Debug, Clone)]
pub enum MutationKind {
    SetRating(Rating),
    RemoveModifier,
    TagMax,
    StoreCheckResult(CheckResult),
    AdvanceRoller(Roller),
    ResetDifficulty(u8),
    DisableCheck,
}

#[derive(Debug, Clone)]
pub struct Mutation {
    pub record: RecordId,
    pub kind: MutationKind,
}

impl Mutation {
    pub fn new(record: RecordId, kind: MutationKind) -> Self {
        Self { record, kind }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
}

/// Append-only buffer of mutations produced while a cycle is computed.
///
/// Nothing touches the [`RatingStore`] until [`MutationLog::replay`] runs,
/// which drains the buffer in one serialized pass. Entries are ordered by
/// record; a record's own entries keep the order they were buffered in.
#[derive(Resource, Debug, Default)]
pub struct MutationLog {
    entries: Vec<Mutation>,
}

impl MutationLog {
    pub fn push(&mut self, record: RecordId, kind: MutationKind) {
        self.entries.push(Mutation::new(record, kind));
    }

    /// Append per-record batches as produced by parallel workers.
    pub fn extend_batches<I>(&mut self, batches: I)
    where
        I: IntoIterator<Item = Vec<Mutation>>,
    {
        for batch in batches {
            self.entries.extend(batch);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Mutation] {
        &self.entries
    }

    /// Apply every buffered mutation to `store` and empty the log. A
    /// mutation addressed to a missing record is reported and skipped; the
    /// rest still apply.
    pub fn replay(&mut self, store: &mut RatingStore) -> (ReplaySummary, Vec<RecordFailure>) {
        // Stable: same-record entries keep buffer order.
        self.entries.sort_by_key(|mutation| mutation.record);

        let mut summary = ReplaySummary::default();
        let mut failures: Vec<RecordFailure> = Vec::new();
        for mutation in self.entries.drain(..) {
            let record = mutation.record;
            if apply(store, mutation) {
                summary.applied += 1;
            } else if failures.last().map(|f| f.record) != Some(record) {
                failures.push(RecordFailure {
                    record,
                    error: CycleError::UnknownRecord,
                });
            }
        }
        (summary, failures)
    }
}

fn apply(store: &mut RatingStore, mutation: Mutation) -> bool {
    let id = mutation.record;
    match mutation.kind {
        MutationKind::RemoveModifier => {
            if store.get(id).is_none() {
                return false;
            }
            store.remove_modifier(id);
        }
        MutationKind::DisableCheck => {
            if store.get(id).is_none() {
                return false;
            }
            store.disable_check(id);
        }
        kind => {
            let Some(record) = store.get_mut(id) else {
                return false;
            };
            match kind {
                MutationKind::SetRating(rating) => record.rating = rating,
                MutationKind::TagMax => record.max_tag = true,
                MutationKind::StoreCheckResult(result) => record.last_check = Some(result),
                MutationKind::AdvanceRoller(roller) => record.roller = roller,
                MutationKind::ResetDifficulty(difficulty) => record.difficulty = difficulty,
                MutationKind::RemoveModifier | MutationKind::DisableCheck => {}
            }
        }
    }
    true
}
