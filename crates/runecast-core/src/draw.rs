//! Drawing runes without replacement.
//!
//! Selection is a partial Fisher–Yates over catalog indices, so a draw of
//! `count` runes always costs O(count) regardless of how close `count` gets
//! to the catalog size. Randomness comes from any [`rand::Rng`]; nothing
//! here is security-sensitive.

use rand::seq::index;
use rand::Rng;
use tracing::trace;

use crate::error::{RuneError, RuneResult};
use crate::spread::{assign_positions, SpreadType};
use crate::types::{DrawnRune, Orientation, Rune};

/// Pick `count` distinct runes from the catalog.
///
/// Fails with [`RuneError::InsufficientCatalog`] rather than returning
/// duplicates or a short result.
pub fn draw<R: Rng + ?Sized>(catalog: &[Rune], count: usize, rng: &mut R) -> RuneResult<Vec<Rune>> {
    if catalog.len() < count {
        return Err(RuneError::InsufficientCatalog {
            requested: count,
            available: catalog.len(),
        });
    }

    let picked: Vec<Rune> = index::sample(rng, catalog.len(), count)
        .into_iter()
        .map(|i| catalog[i].clone())
        .collect();

    trace!(count, available = catalog.len(), "drew runes");
    Ok(picked)
}

/// Fair coin flip between upright and reversed
pub fn random_orientation<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
    if rng.random_bool(0.5) {
        Orientation::Upright
    } else {
        Orientation::Reversed
    }
}

/// Draw `count` runes and give each an independent orientation
pub fn draw_oriented<R: Rng + ?Sized>(
    catalog: &[Rune],
    count: usize,
    rng: &mut R,
) -> RuneResult<Vec<(Rune, Orientation)>> {
    let runes = draw(catalog, count, rng)?;
    Ok(runes
        .into_iter()
        .map(|rune| {
            let orientation = random_orientation(rng);
            (rune, orientation)
        })
        .collect())
}

/// Draw a full spread: selection, orientation and position mapping
pub fn draw_spread<R: Rng + ?Sized>(
    catalog: &[Rune],
    spread: SpreadType,
    rng: &mut R,
) -> RuneResult<Vec<DrawnRune>> {
    let oriented = draw_oriented(catalog, spread.position_count(), rng)?;
    assign_positions(oriented, spread.positions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuneCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_draw_returns_distinct_runes() {
        let catalog = RuneCatalog::elder_futhark();
        let mut rng = StdRng::seed_from_u64(7);

        for count in 0..=catalog.len() {
            let drawn = draw(catalog.runes(), count, &mut rng).unwrap();
            assert_eq!(drawn.len(), count);
            let ids: HashSet<_> = drawn.iter().map(|r| r.id.clone()).collect();
            assert_eq!(ids.len(), count);
        }
    }

    #[test]
    fn test_draw_insufficient_catalog() {
        let catalog = RuneCatalog::elder_futhark();
        let small = &catalog.runes()[..2];
        let mut rng = StdRng::seed_from_u64(1);

        let err = draw(small, 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            RuneError::InsufficientCatalog {
                requested: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_draw_whole_catalog_is_a_permutation() {
        let catalog = RuneCatalog::elder_futhark();
        let mut rng = StdRng::seed_from_u64(99);
        let drawn = draw(catalog.runes(), 24, &mut rng).unwrap();

        let mut positions: Vec<_> = drawn.iter().map(|r| r.position).collect();
        positions.sort_unstable();
        assert_eq!(positions, (1..=24).collect::<Vec<u8>>());
    }

    #[test]
    fn test_orientation_is_roughly_fair() {
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 20_000;
        let upright = (0..trials)
            .filter(|_| random_orientation(&mut rng) == Orientation::Upright)
            .count();
        let ratio = upright as f64 / trials as f64;
        assert!((0.47..0.53).contains(&ratio), "upright ratio {ratio}");
    }

    #[test]
    fn test_draw_spread_maps_positions() {
        let catalog = RuneCatalog::elder_futhark();
        let mut rng = StdRng::seed_from_u64(3);
        let drawn = draw_spread(catalog.runes(), SpreadType::CelticCross, &mut rng).unwrap();

        assert_eq!(drawn.len(), 10);
        assert_eq!(drawn[0].position.name, "present");
        assert_eq!(drawn[9].position.name, "outcome");
    }
}
