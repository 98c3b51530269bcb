#![allow(dead_code)]

use bevy::prelude::App;
use rating_math::{Digit, Rating, RatingShape, RecordSelector};
use rating_sim::{
    build_headless_app_with_config, RatingConfig, RatingStore, RecordId, RecordView, RosterEntry,
};

pub fn roster(entries: &[(&str, &str)]) -> Vec<RosterEntry> {
    entries
        .iter()
        .map(|(name, rating)| RosterEntry {
            name: name.to_string(),
            rating: rating.to_string(),
        })
        .collect()
}

pub fn app_with(worker_threads: usize, roster: Vec<RosterEntry>) -> App {
    build_headless_app_with_config(RatingConfig {
        roller_seed: 4242,
        worker_threads,
        roster,
        ..RatingConfig::default()
    })
}

/// A spread of records across all shapes and most of the range.
pub fn crowd_app(worker_threads: usize, records: u32) -> App {
    let mut app = app_with(worker_threads, Vec::new());
    {
        let mut store = app.world.resource_mut::<RatingStore>();
        let shapes = [RatingShape::Two, RatingShape::Three, RatingShape::Four];
        for index in 0..records {
            let shape = shapes[index as usize % shapes.len()];
            let base = Rating::filled(shape, Digit::MIN);
            let rating = rating_math::add(base, index * 7 % 200);
            store.spawn(format!("r{index}"), rating);
        }
    }
    app
}

/// Operator activity for a cycle, derived from the cycle number only.
pub fn scripted_requests(app: &mut App, cycle: u32) {
    let records = app.world.resource::<RatingStore>().len() as u32;
    for id in 0..records {
        let selector = RecordSelector::Id(id);
        let mix = id.wrapping_mul(31).wrapping_add(cycle.wrapping_mul(17));
        if mix % 3 == 0 {
            let delta = (mix % 11) as i32 - 5;
            rating_sim::request_modifier(&mut app.world, &selector, delta);
        }
        if mix % 4 == 1 {
            rating_sim::request_check(&mut app.world, &selector, (mix % 5) as u8);
        }
    }
}

pub fn views(app: &App) -> Vec<RecordView> {
    let store = app.world.resource::<RatingStore>();
    (0..store.len() as u32)
        .filter_map(|id| store.view(RecordId(id)))
        .collect()
}
