//! Batch engine for the Esoteric rating mechanic.
//!
//! Every cycle applies pending modifiers and resolves pending checks across
//! all records. Both passes are computed in parallel against the unmodified
//! [`RatingStore`] and buffered into a [`MutationLog`], which is replayed in
//! one serialized step before the cycle ends. Call [`run_cycle`] to advance.

mod hashing;
pub mod metrics;
mod mutations;
mod rating_config;
mod records;
mod resources;
mod systems;

use bevy::prelude::*;
use rating_math::{Rating, RecordSelector};
use tracing::warn;

pub use hashing::{record_seed, FnvHasher};
pub use metrics::CycleMetrics;
pub use mutations::{CycleError, Mutation, MutationKind, MutationLog, RecordFailure, ReplaySummary};
pub use rating_config::{
    load_rating_config_from_env, RatingConfig, RatingConfigError, RosterEntry,
    BUILTIN_RATING_CONFIG,
};
pub use records::{
    CheckRequest, CheckResult, Modifier, RatingRecord, RatingStore, RecordId, RecordView,
};
pub use resources::{CycleCounter, WorkerPool};
pub use systems::{check_pass, modifier_pass, spawn_roster, PassOutput, PassTally};

/// Construct a headless [`App`] from the environment's configuration.
pub fn build_headless_app() -> App {
    let (config, _path) = load_rating_config_from_env();
    build_headless_app_with_config(config)
}

/// Construct a headless [`App`] running the rating cycle
/// (compute → replay → counter).
pub fn build_headless_app_with_config(config: RatingConfig) -> App {
    let mut app = App::new();

    let pool = WorkerPool::with_threads(config.worker_threads).unwrap_or_else(|err| {
        warn!(
            target: "esoteric::config",
            threads = config.worker_threads,
            error = %err,
            "worker_pool.build_failed=global_fallback"
        );
        WorkerPool::global()
    });
    let mut store = RatingStore::new(config.roller_seed);
    spawn_roster(&mut store, &config.roster);

    app.insert_resource(config)
        .insert_resource(store)
        .insert_resource(pool)
        .insert_resource(MutationLog::default())
        .insert_resource(CycleCounter::default())
        .insert_resource(CycleMetrics::default())
        .add_plugins(MinimalPlugins)
        .add_systems(
            Update,
            (
                systems::compute_cycle,
                systems::replay_mutations,
                systems::advance_cycle,
            )
                .chain(),
        );

    app
}

/// Execute a single cycle.
pub fn run_cycle(app: &mut App) {
    app.update();
}

/// Queue a modifier on every record `selector` matches.
pub fn request_modifier(world: &mut World, selector: &RecordSelector, delta: i32) -> usize {
    world
        .resource_mut::<RatingStore>()
        .request_modifier(selector, delta)
}

/// Enable a check at `difficulty` on every record `selector` matches.
pub fn request_check(world: &mut World, selector: &RecordSelector, difficulty: u8) -> usize {
    world
        .resource_mut::<RatingStore>()
        .request_check(selector, difficulty)
}

pub fn read_rating(world: &World, id: RecordId) -> Option<Rating> {
    world.resource::<RatingStore>().rating(id)
}

pub fn read_check_result(world: &World, id: RecordId) -> Option<CheckResult> {
    world.resource::<RatingStore>().check_result(id)
}
