//! Property-based tests for the draw algorithm and the reading state machine
//!
//! Uses proptest to check distinctness, sizing and reveal monotonicity
//! across arbitrary seeds, catalog sizes and reveal orders.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use runecast_core::draw::{draw, draw_oriented, draw_spread};
use runecast_core::{
    Reading, ReadingPhase, RevealOutcome, RuneCatalog, RuneError, SpreadType,
};

// ============================================================================
// Strategy Generators
// ============================================================================

fn spread_strategy() -> impl Strategy<Value = SpreadType> {
    prop::sample::select(SpreadType::ALL.to_vec())
}

/// Reveal orders including repeats and out-of-range indices
fn reveal_order_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..12usize, 0..40)
}

// ============================================================================
// Draw Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_draw_is_distinct_and_sized(seed in any::<u64>(), size in 0..=24usize, count in 0..=24usize) {
        let catalog = RuneCatalog::elder_futhark();
        let pool = &catalog.runes()[..size];
        let mut rng = StdRng::seed_from_u64(seed);

        match draw(pool, count, &mut rng) {
            Ok(drawn) => {
                prop_assert!(count <= size);
                prop_assert_eq!(drawn.len(), count);
                let ids: HashSet<_> = drawn.iter().map(|r| r.id.clone()).collect();
                prop_assert_eq!(ids.len(), count);
                for rune in &drawn {
                    prop_assert!(pool.contains(rune));
                }
            }
            Err(RuneError::InsufficientCatalog { requested, available }) => {
                prop_assert!(count > size);
                prop_assert_eq!(requested, count);
                prop_assert_eq!(available, size);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_draw_does_not_modify_catalog(seed in any::<u64>(), count in 0..=24usize) {
        let catalog = RuneCatalog::elder_futhark();
        let before = catalog.runes().to_vec();
        let mut rng = StdRng::seed_from_u64(seed);

        let _ = draw_oriented(catalog.runes(), count, &mut rng).unwrap();
        prop_assert_eq!(catalog.runes(), before.as_slice());
    }

    #[test]
    fn prop_spread_positions_follow_definition(seed in any::<u64>(), spread in spread_strategy()) {
        let catalog = RuneCatalog::elder_futhark();
        let mut rng = StdRng::seed_from_u64(seed);

        let drawn = draw_spread(catalog.runes(), spread, &mut rng).unwrap();
        let names: Vec<_> = drawn.iter().map(|d| d.position.name).collect();
        let expected: Vec<_> = spread.positions().iter().map(|p| p.name).collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn prop_same_seed_same_draw(seed in any::<u64>(), spread in spread_strategy()) {
        let catalog = RuneCatalog::elder_futhark();
        let a = draw_spread(catalog.runes(), spread, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = draw_spread(catalog.runes(), spread, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ============================================================================
// Reading Properties
// ============================================================================

proptest! {
    /// However positions are revealed, completion is reported at most once
    /// and only after every position is face up.
    #[test]
    fn prop_completion_is_one_shot(
        seed in any::<u64>(),
        spread in spread_strategy(),
        order in reveal_order_strategy(),
    ) {
        let catalog = RuneCatalog::elder_futhark();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut reading = Reading::new(spread);
        reading.begin("What is hidden from me?").unwrap();
        reading.deal(draw_spread(catalog.runes(), spread, &mut rng).unwrap()).unwrap();

        let count = spread.position_count();
        let mut completions = 0;
        let mut previous = 0;

        // Finish with a full sweep so every run ends complete
        for index in order.into_iter().chain(0..count) {
            match reading.reveal(index) {
                Ok(RevealOutcome::Completed(ticket)) => {
                    completions += 1;
                    prop_assert_eq!(ticket.placements().len(), count);
                }
                Ok(_) => {}
                Err(RuneError::InvalidPosition { .. }) => prop_assert!(index >= count),
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            prop_assert!(reading.revealed_count() >= previous);
            previous = reading.revealed_count();
            prop_assert_eq!(
                reading.phase() == ReadingPhase::Complete,
                reading.revealed_count() == count
            );
        }

        prop_assert_eq!(completions, 1);
    }
}

// ============================================================================
// Distribution
// ============================================================================

#[test]
fn test_orientation_is_roughly_even() {
    let catalog = RuneCatalog::elder_futhark();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let trials = 10_000;

    let reversed = (0..trials)
        .map(|_| draw_oriented(catalog.runes(), 1, &mut rng).unwrap())
        .filter(|drawn| drawn[0].1 == runecast_core::Orientation::Reversed)
        .count();

    let ratio = reversed as f64 / trials as f64;
    assert!((0.45..0.55).contains(&ratio), "reversed ratio {ratio}");
}

#[test]
fn test_every_rune_can_be_drawn() {
    let catalog = RuneCatalog::elder_futhark();
    let mut rng = StdRng::seed_from_u64(7);
    let mut seen = HashSet::new();

    for _ in 0..2_000 {
        let drawn = draw(catalog.runes(), 3, &mut rng).unwrap();
        seen.extend(drawn.into_iter().map(|r| r.id));
    }
    assert_eq!(seen.len(), catalog.len());
}
