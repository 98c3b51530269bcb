use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bevy::prelude::Resource;
use rating_math::{Level, Rating, RecordSelector, Roller, DEFAULT_DIFFICULTY};
use serde::Serialize;

use crate::hashing::record_seed;

/// Stable index of a record in the [`RatingStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pending signed delta, consumed by the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub delta: i32,
}

/// Last resolved check of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub roll: Rating,
    pub level: Level,
}

/// Pending-check state as the operator sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CheckRequest {
    pub enabled: bool,
    pub difficulty: u8,
}

#[derive(Clone, Debug)]
pub struct RatingRecord {
    id: RecordId,
    name: String,
    pub(crate) rating: Rating,
    pub(crate) max_tag: bool,
    pub(crate) difficulty: u8,
    pub(crate) roller: Roller,
    pub(crate) last_check: Option<CheckResult>,
}

impl RatingRecord {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn is_maxed(&self) -> bool {
        self.max_tag
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn last_check(&self) -> Option<CheckResult> {
        self.last_check
    }

    pub fn roller(&self) -> &Roller {
        &self.roller
    }

    fn matches(&self, selector: &RecordSelector) -> bool {
        match selector {
            RecordSelector::All => true,
            RecordSelector::Id(id) => self.id.0 == *id,
            RecordSelector::Name(name) => self.name == *name,
            RecordSelector::Shape(shape) => self.rating.shape() == *shape,
        }
    }
}

/// Serializable view of one record for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub name: String,
    pub rating: Rating,
    pub maxed: bool,
    pub pending_modifier: Option<i32>,
    pub check: CheckRequest,
    pub last_check: Option<CheckResult>,
}

/// Authoritative record storage.
///
/// Records live in a flat slot vector indexed by [`RecordId`]. Pending
/// modifiers and pending checks are kept as index collections so a cycle
/// only visits the records that have work.
#[derive(Resource, Debug, Default)]
pub struct RatingStore {
    records: Vec<RatingRecord>,
    pending_modifiers: BTreeMap<RecordId, Modifier>,
    pending_checks: BTreeSet<RecordId>,
    base_seed: u64,
}

impl RatingStore {
    pub fn new(base_seed: u64) -> Self {
        Self {
            base_seed,
            ..Self::default()
        }
    }

    /// Add a record. Its roller is seeded from the record id and never
    /// reseeded afterwards; the check starts disabled at the default
    /// difficulty.
    pub fn spawn(&mut self, name: impl Into<String>, rating: Rating) -> RecordId {
        let id = RecordId(self.records.len() as u32);
        self.records.push(RatingRecord {
            id,
            name: name.into(),
            rating,
            max_tag: false,
            difficulty: DEFAULT_DIFFICULTY,
            roller: Roller::from_seed(record_seed(self.base_seed, id)),
            last_check: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&RatingRecord> {
        self.records.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut RatingRecord> {
        self.records.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatingRecord> {
        self.records.iter()
    }

    pub fn select(&self, selector: &RecordSelector) -> Vec<RecordId> {
        self.records
            .iter()
            .filter(|record| record.matches(selector))
            .map(RatingRecord::id)
            .collect()
    }

    /// Attach (or overwrite) a pending modifier on every matching record.
    /// Returns how many records matched.
    pub fn request_modifier(&mut self, selector: &RecordSelector, delta: i32) -> usize {
        let matched = self.select(selector);
        for id in &matched {
            self.pending_modifiers.insert(*id, Modifier { delta });
        }
        matched.len()
    }

    /// Set the difficulty and enable a pending check on every matching
    /// record. Returns how many records matched.
    pub fn request_check(&mut self, selector: &RecordSelector, difficulty: u8) -> usize {
        let matched = self.select(selector);
        for id in &matched {
            if let Some(record) = self.records.get_mut(id.0 as usize) {
                record.difficulty = difficulty;
            }
            self.pending_checks.insert(*id);
        }
        matched.len()
    }

    pub fn rating(&self, id: RecordId) -> Option<Rating> {
        self.get(id).map(RatingRecord::rating)
    }

    pub fn is_maxed(&self, id: RecordId) -> bool {
        self.get(id).is_some_and(RatingRecord::is_maxed)
    }

    pub fn check_result(&self, id: RecordId) -> Option<CheckResult> {
        self.get(id).and_then(RatingRecord::last_check)
    }

    pub fn check_request(&self, id: RecordId) -> Option<CheckRequest> {
        self.get(id).map(|record| CheckRequest {
            enabled: self.pending_checks.contains(&id),
            difficulty: record.difficulty,
        })
    }

    pub fn pending_modifier(&self, id: RecordId) -> Option<Modifier> {
        self.pending_modifiers.get(&id).copied()
    }

    pub fn pending_modifiers(&self) -> impl Iterator<Item = (RecordId, Modifier)> + '_ {
        self.pending_modifiers.iter().map(|(id, m)| (*id, *m))
    }

    pub fn pending_checks(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.pending_checks.iter().copied()
    }

    pub(crate) fn remove_modifier(&mut self, id: RecordId) {
        self.pending_modifiers.remove(&id);
    }

    pub(crate) fn disable_check(&mut self, id: RecordId) {
        self.pending_checks.remove(&id);
    }

    pub fn view(&self, id: RecordId) -> Option<RecordView> {
        let record = self.get(id)?;
        Some(RecordView {
            id,
            name: record.name.clone(),
            rating: record.rating,
            maxed: record.max_tag,
            pending_modifier: self.pending_modifier(id).map(|m| m.delta),
            check: self.check_request(id)?,
            last_check: record.last_check,
        })
    }
}
