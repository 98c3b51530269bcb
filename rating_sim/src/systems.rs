use bevy::prelude::*;
use rating_math::{
    apply_delta, is_max_value, resolve, roll_for, Level, Rating, DEFAULT_DIFFICULTY,
};
use tracing::{debug, info, warn};

use crate::{
    metrics::CycleMetrics,
    mutations::{CycleError, Mutation, MutationKind, MutationLog, RecordFailure},
    rating_config::RosterEntry,
    records::{CheckResult, Modifier, RatingRecord, RatingStore, RecordId},
    resources::{CycleCounter, WorkerPool},
};

/// Counters gathered while a pass is computed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassTally {
    pub modifiers_applied: u32,
    pub modifiers_discarded_at_max: u32,
    pub saturated: u32,
    pub checks_resolved: u32,
    pub levels: [u32; 4],
}

impl PassTally {
    fn merge(&mut self, other: &PassTally) {
        self.modifiers_applied += other.modifiers_applied;
        self.modifiers_discarded_at_max += other.modifiers_discarded_at_max;
        self.saturated += other.saturated;
        self.checks_resolved += other.checks_resolved;
        for (total, count) in self.levels.iter_mut().zip(other.levels) {
            *total += count;
        }
    }
}

/// Buffered output of one pass over the store.
#[derive(Debug, Default)]
pub struct PassOutput {
    pub mutations: Vec<Vec<Mutation>>,
    pub failures: Vec<RecordFailure>,
    pub tally: PassTally,
}

struct RecordWork {
    mutations: Vec<Mutation>,
    failure: Option<RecordFailure>,
    tally: PassTally,
}

impl RecordWork {
    fn new() -> Self {
        Self {
            mutations: Vec::new(),
            failure: None,
            tally: PassTally::default(),
        }
    }
}

impl FromIterator<RecordWork> for PassOutput {
    fn from_iter<T: IntoIterator<Item = RecordWork>>(iter: T) -> Self {
        let mut output = PassOutput::default();
        for work in iter {
            output.tally.merge(&work.tally);
            output.failures.extend(work.failure);
            output.mutations.push(work.mutations);
        }
        output
    }
}

/// Compute the effect of every pending modifier against the current store.
pub fn modifier_pass(store: &RatingStore, pool: &WorkerPool) -> PassOutput {
    let pending: Vec<(RecordId, Modifier)> = store.pending_modifiers().collect();
    pool.map(&pending, |(id, modifier)| match store.get(*id) {
        Some(record) => modifier_work(record, *modifier),
        None => missing_record(*id),
    })
    .into_iter()
    .collect()
}

fn modifier_work(record: &RatingRecord, modifier: Modifier) -> RecordWork {
    let id = record.id();
    let mut work = RecordWork::new();
    let mut push = |kind| work.mutations.push(Mutation::new(id, kind));

    let current = record.rating();
    if is_max_value(&current) {
        push(MutationKind::TagMax);
        push(MutationKind::RemoveModifier);
        work.tally.modifiers_discarded_at_max += 1;
        debug!(
            target: "esoteric::cycle",
            record = %id,
            rating = %current,
            delta = modifier.delta,
            "modifier.discarded=max_value"
        );
        return work;
    }

    let mut updated = current;
    if modifier.delta != 0 {
        let outcome = apply_delta(current, modifier.delta);
        updated = outcome.rating;
        push(MutationKind::SetRating(updated));
        if outcome.saturated {
            work.tally.saturated += 1;
        }
        debug!(
            target: "esoteric::cycle",
            record = %id,
            from = %current,
            to = %updated,
            delta = modifier.delta,
            applied = outcome.applied,
            "modifier.applied"
        );
    }
    push(MutationKind::RemoveModifier);
    if is_max_value(&updated) {
        push(MutationKind::TagMax);
    }
    work.tally.modifiers_applied += 1;
    work
}

/// Roll and resolve every pending check against the current store.
pub fn check_pass(store: &RatingStore, pool: &WorkerPool) -> PassOutput {
    let pending: Vec<RecordId> = store.pending_checks().collect();
    pool.map(&pending, |id| match store.get(*id) {
        Some(record) => check_work(record),
        None => missing_record(*id),
    })
    .into_iter()
    .collect()
}

fn check_work(record: &RatingRecord) -> RecordWork {
    let id = record.id();
    let stat = record.rating();
    let mut roller = record.roller().clone();
    let roll = roll_for(&mut roller, &stat);
    let level = resolve(&stat, &roll, record.difficulty());
    debug!(
        target: "esoteric::cycle",
        record = %id,
        stat = %stat,
        roll = %roll,
        difficulty = record.difficulty(),
        level = %level,
        "check.resolved"
    );

    let mut work = RecordWork::new();
    work.mutations = vec![
        Mutation::new(id, MutationKind::AdvanceRoller(roller)),
        Mutation::new(
            id,
            MutationKind::StoreCheckResult(CheckResult { roll, level }),
        ),
        Mutation::new(id, MutationKind::ResetDifficulty(DEFAULT_DIFFICULTY)),
        Mutation::new(id, MutationKind::DisableCheck),
    ];
    work.tally.checks_resolved = 1;
    work.tally.levels[level.index()] = 1;
    work
}

fn missing_record(id: RecordId) -> RecordWork {
    let mut work = RecordWork::new();
    work.failure = Some(RecordFailure {
        record: id,
        error: CycleError::UnknownRecord,
    });
    work
}

/// Run both passes against the unmodified store and buffer their output.
pub fn compute_cycle(
    store: Res<RatingStore>,
    pool: Res<WorkerPool>,
    mut log: ResMut<MutationLog>,
    mut metrics: ResMut<CycleMetrics>,
) {
    let store: &RatingStore = &store;
    let pool: &WorkerPool = &pool;

    let (modifiers, checks) = pool.join(
        || modifier_pass(store, pool),
        || check_pass(store, pool),
    );

    metrics.reset();
    let mut tally = modifiers.tally;
    tally.merge(&checks.tally);
    metrics.modifiers_applied = tally.modifiers_applied;
    metrics.modifiers_discarded_at_max = tally.modifiers_discarded_at_max;
    metrics.saturated = tally.saturated;
    metrics.checks_resolved = tally.checks_resolved;
    metrics.levels = tally.levels;
    metrics.failures.extend(modifiers.failures);
    metrics.failures.extend(checks.failures);

    log.extend_batches(modifiers.mutations);
    log.extend_batches(checks.mutations);
}

/// Apply the buffered mutations in one serialized pass.
pub fn replay_mutations(
    mut store: ResMut<RatingStore>,
    mut log: ResMut<MutationLog>,
    mut metrics: ResMut<CycleMetrics>,
) {
    let (summary, failures) = log.replay(&mut store);
    metrics.mutations_replayed = summary.applied;
    metrics.failures.extend(failures);
}

pub fn advance_cycle(mut counter: ResMut<CycleCounter>, mut metrics: ResMut<CycleMetrics>) {
    counter.0 = counter.0.wrapping_add(1);
    metrics.cycle = counter.0;
    if metrics.modifiers_applied + metrics.checks_resolved > 0 || !metrics.failures.is_empty() {
        info!(
            target: "esoteric::cycle",
            cycle = counter.0,
            modifiers = metrics.modifiers_applied,
            discarded_at_max = metrics.modifiers_discarded_at_max,
            checks = metrics.checks_resolved,
            botches = metrics.level_count(Level::Botch),
            triumphs = metrics.level_count(Level::Triumph),
            failures = metrics.failures.len(),
            "cycle.completed"
        );
    }
}

/// Spawn authored records. Entries whose rating does not parse are logged
/// and skipped; the others still spawn.
pub fn spawn_roster(store: &mut RatingStore, roster: &[RosterEntry]) -> Vec<RecordId> {
    let mut spawned = Vec::with_capacity(roster.len());
    for entry in roster {
        match entry.rating.parse::<Rating>() {
            Ok(rating) => {
                let id = store.spawn(entry.name.clone(), rating);
                debug!(
                    target: "esoteric::cycle",
                    record = %id,
                    name = %entry.name,
                    rating = %rating,
                    "record.spawned"
                );
                spawned.push(id);
            }
            Err(err) => warn!(
                target: "esoteric::cycle",
                name = %entry.name,
                error = %err,
                "record.rejected=invalid_rating"
            ),
        }
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::World;
    use bevy_ecs::system::RunSystemOnce;
    use rating_math::RecordSelector;

    fn rating(text: &str) -> Rating {
        text.parse().unwrap()
    }

    fn world_with(records: &[(&str, &str)]) -> World {
        let mut world = World::default();
        let mut store = RatingStore::new(5);
        for (name, value) in records {
            store.spawn(*name, rating(value));
        }
        world.insert_resource(store);
        world.insert_resource(WorkerPool::sequential());
        world.insert_resource(MutationLog::default());
        world.insert_resource(CycleMetrics::default());
        world.insert_resource(CycleCounter::default());
        world
    }

    fn run_cycle(world: &mut World) {
        world.run_system_once(compute_cycle);
        world.run_system_once(replay_mutations);
        world.run_system_once(advance_cycle);
    }

    #[test]
    fn compute_alone_leaves_store_untouched() {
        let mut world = world_with(&[("a", "3:3")]);
        world
            .resource_mut::<RatingStore>()
            .request_modifier(&RecordSelector::All, 2);
        world.run_system_once(compute_cycle);

        assert_eq!(
            world.resource::<RatingStore>().rating(RecordId(0)),
            Some(rating("3:3"))
        );
        assert!(!world.resource::<MutationLog>().is_empty());

        world.run_system_once(replay_mutations);
        assert_eq!(
            world.resource::<RatingStore>().rating(RecordId(0)),
            Some(rating("3:5"))
        );
        assert!(world.resource::<MutationLog>().is_empty());
    }

    #[test]
    fn modifier_is_consumed_and_carries() {
        let mut world = world_with(&[("a", "2:5:6")]);
        world
            .resource_mut::<RatingStore>()
            .request_modifier(&RecordSelector::All, 1);
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("2:6:1")));
        assert!(store.pending_modifier(RecordId(0)).is_none());
        assert_eq!(world.resource::<CycleMetrics>().modifiers_applied, 1);
    }

    #[test]
    fn zero_modifier_is_removed_without_change() {
        let mut world = world_with(&[("a", "4:4")]);
        world
            .resource_mut::<RatingStore>()
            .request_modifier(&RecordSelector::All, 0);
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("4:4")));
        assert!(store.pending_modifier(RecordId(0)).is_none());
    }

    #[test]
    fn reaching_max_tags_record() {
        let mut world = world_with(&[("a", "6:4"), ("b", "6:6:5")]);
        world
            .resource_mut::<RatingStore>()
            .request_modifier(&RecordSelector::All, 3);
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("6:6")));
        assert!(store.get(RecordId(0)).unwrap().is_maxed());
        assert_eq!(store.rating(RecordId(1)), Some(rating("6:6:6")));
        assert!(store.get(RecordId(1)).unwrap().is_maxed());
        assert_eq!(world.resource::<CycleMetrics>().saturated, 2);
    }

    #[test]
    fn maxed_rating_discards_modifier_without_arithmetic() {
        let mut world = world_with(&[("a", "6:6")]);
        world
            .resource_mut::<RatingStore>()
            .request_modifier(&RecordSelector::All, -4);
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("6:6")));
        assert!(store.get(RecordId(0)).unwrap().is_maxed());
        assert!(store.pending_modifier(RecordId(0)).is_none());
        let metrics = world.resource::<CycleMetrics>();
        assert_eq!(metrics.modifiers_discarded_at_max, 1);
        assert_eq!(metrics.modifiers_applied, 0);
    }

    #[test]
    fn huge_negative_modifier_saturates_at_floor() {
        let mut world = world_with(&[("a", "3:3"), ("b", "3:3")]);
        {
            let mut store = world.resource_mut::<RatingStore>();
            store.request_modifier(&RecordSelector::Id(0), i32::MIN);
            store.request_modifier(&RecordSelector::Id(1), -1);
        }
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("1:1")));
        assert!(!store.get(RecordId(0)).unwrap().is_maxed());
        assert!(store.pending_modifier(RecordId(0)).is_none());
        assert_eq!(store.rating(RecordId(1)), Some(rating("3:2")));
        let metrics = world.resource::<CycleMetrics>();
        assert!(metrics.failures.is_empty());
        assert_eq!(metrics.modifiers_applied, 2);
        assert_eq!(metrics.saturated, 1);
    }

    #[test]
    fn huge_positive_modifier_reaches_max_and_tags() {
        let mut world = world_with(&[("a", "1:1"), ("b", "1:1:1:1")]);
        world
            .resource_mut::<RatingStore>()
            .request_modifier(&RecordSelector::All, 5000);
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("6:6")));
        assert!(store.get(RecordId(0)).unwrap().is_maxed());
        assert_eq!(store.rating(RecordId(1)), Some(rating("6:6:6:6")));
        assert!(store.is_maxed(RecordId(1)));
        assert!(world.resource::<CycleMetrics>().failures.is_empty());
    }

    #[test]
    fn check_is_single_shot_and_resets_difficulty() {
        let mut world = world_with(&[("a", "4:3"), ("b", "2:2:2")]);
        world
            .resource_mut::<RatingStore>()
            .request_check(&RecordSelector::All, 3);
        run_cycle(&mut world);

        {
            let store = world.resource::<RatingStore>();
            for id in [RecordId(0), RecordId(1)] {
                let request = store.check_request(id).unwrap();
                assert!(!request.enabled);
                assert_eq!(request.difficulty, DEFAULT_DIFFICULTY);
                let result = store.check_result(id).unwrap();
                assert_eq!(result.roll.shape(), store.rating(id).unwrap().shape());
            }
        }
        assert_eq!(world.resource::<CycleMetrics>().checks_resolved, 2);

        let before = world.resource::<RatingStore>().check_result(RecordId(0));
        run_cycle(&mut world);
        let store = world.resource::<RatingStore>();
        assert_eq!(store.check_result(RecordId(0)), before);
        assert!(!store.check_request(RecordId(0)).unwrap().enabled);
        assert_eq!(world.resource::<CycleMetrics>().checks_resolved, 0);
    }

    #[test]
    fn check_result_follows_resolution_rules() {
        let mut world = world_with(&[("a", "3:4")]);
        world
            .resource_mut::<RatingStore>()
            .request_check(&RecordSelector::All, 2);
        let expected_roll = {
            let store = world.resource::<RatingStore>();
            let mut roller = store.get(RecordId(0)).unwrap().roller().clone();
            roll_for(&mut roller, &rating("3:4"))
        };
        run_cycle(&mut world);

        let result = world
            .resource::<RatingStore>()
            .check_result(RecordId(0))
            .unwrap();
        assert_eq!(result.roll, expected_roll);
        assert_eq!(result.level, resolve(&rating("3:4"), &expected_roll, 2));
    }

    #[test]
    fn successive_checks_draw_fresh_rolls() {
        let mut world = world_with(&[("a", "3:4:2:2")]);
        let mut rolls = Vec::new();
        for _ in 0..6 {
            world
                .resource_mut::<RatingStore>()
                .request_check(&RecordSelector::All, 1);
            run_cycle(&mut world);
            rolls.push(
                world
                    .resource::<RatingStore>()
                    .check_result(RecordId(0))
                    .unwrap()
                    .roll,
            );
        }
        rolls.dedup();
        assert!(rolls.len() > 1, "roller never advanced: {rolls:?}");
    }

    #[test]
    fn check_uses_rating_from_before_the_cycle() {
        let mut world = world_with(&[("a", "2:2")]);
        {
            let mut store = world.resource_mut::<RatingStore>();
            store.request_modifier(&RecordSelector::All, 20);
            store.request_check(&RecordSelector::All, 1);
        }
        let expected_roll = {
            let store = world.resource::<RatingStore>();
            let mut roller = store.get(RecordId(0)).unwrap().roller().clone();
            roll_for(&mut roller, &rating("2:2"))
        };
        run_cycle(&mut world);

        let store = world.resource::<RatingStore>();
        assert_eq!(store.rating(RecordId(0)), Some(rating("5:4")));
        let result = store.check_result(RecordId(0)).unwrap();
        assert_eq!(result.level, resolve(&rating("2:2"), &expected_roll, 1));
    }

    #[test]
    fn cycle_counter_advances() {
        let mut world = world_with(&[]);
        run_cycle(&mut world);
        run_cycle(&mut world);
        assert_eq!(world.resource::<CycleCounter>().0, 2);
        assert_eq!(world.resource::<CycleMetrics>().cycle, 2);
    }

    #[test]
    fn roster_skips_invalid_entries() {
        let mut store = RatingStore::new(0);
        let roster = vec![
            RosterEntry {
                name: "good".into(),
                rating: "3:3".into(),
            },
            RosterEntry {
                name: "bad".into(),
                rating: "3:9".into(),
            },
            RosterEntry {
                name: "also_good".into(),
                rating: "1:2:3".into(),
            },
        ];
        let spawned = spawn_roster(&mut store, &roster);
        assert_eq!(spawned, vec![RecordId(0), RecordId(1)]);
        assert_eq!(store.get(RecordId(1)).unwrap().name(), "also_good");
    }
}
