use bevy::prelude::*;
use rating_math::Level;

use crate::mutations::RecordFailure;

/// Tallies for the most recent cycle.
#[derive(Resource, Default, Debug, Clone)]
pub struct CycleMetrics {
    pub cycle: u64,
    pub modifiers_applied: u32,
    pub modifiers_discarded_at_max: u32,
    pub saturated: u32,
    pub checks_resolved: u32,
    pub levels: [u32; 4],
    pub mutations_replayed: usize,
    pub failures: Vec<RecordFailure>,
}

impl CycleMetrics {
    pub fn level_count(&self, level: Level) -> u32 {
        self.levels[level.index()]
    }

    pub(crate) fn reset(&mut self) {
        let cycle = self.cycle;
        *self = Self {
            cycle,
            ..Self::default()
        };
    }
}
