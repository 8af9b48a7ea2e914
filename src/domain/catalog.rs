//! The fixed product catalog that transformation draws names from.
//!
//! The list is versioned: changing its contents or order changes which
//! product a given random draw produces, so bump [`CATALOG_VERSION`] with it.

use super::commodity::ProductType;
use super::sources::RandomSource;

pub const CATALOG_VERSION: u32 = 1;

pub const PRODUCT_NAMES: [&str; 21] = [
    "Coffee - Colombian, Portioned",
    "Rice Pilaf, Dry,package",
    "Bread - Malt",
    "Pineapple - Regular",
    "Beef - Short Loin",
    "Puree - Blackcurrant",
    "Flower - Dish Garden",
    "Salt - Sea",
    "Pasta - Spaghetti, Dry",
    "Cheese - Cheddar, Mild",
    "Wine - Redchard Merritt",
    "Evaporated Milk - Skim",
    "Wine - Red, Cooking",
    "Soup - Knorr, Ministrone",
    "Artichoke - Hearts, Canned",
    "Extract - Rum",
    "Beans - Navy, Dry",
    "Juice - Grapefruit, 341 Ml",
    "Veal - Round, Eye Of",
    "Wine - Toasted Head",
    "Wine - Fried Head",
];

/// Upper bound on rejected draws when sampling a seed batch size.
pub const MAX_BATCH_DRAWS: usize = 1_000;

/// Maps a draw in `[0,1)` to an index in `0..len`, each index equally likely.
pub fn uniform_index(draw: f64, len: usize) -> usize {
    debug_assert!(len > 0);
    let index = (draw * len as f64).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as usize).min(len - 1)
    }
}

pub fn sample_product_name(random: &dyn RandomSource) -> &'static str {
    PRODUCT_NAMES[uniform_index(random.next_unit(), PRODUCT_NAMES.len())]
}

pub fn sample_product_type(random: &dyn RandomSource) -> ProductType {
    ProductType::ALL[uniform_index(random.next_unit(), ProductType::ALL.len())]
}

/// Integer markup factor in `[0, max]`: `round(u * max)`. Zero is allowed.
pub fn sample_markup_factor(random: &dyn RandomSource, max: u32) -> u32 {
    (random.next_unit() * f64::from(max)).round() as u32
}

/// Seed batch size by rejection sampling.
///
/// Draws `round(u * max)` and re-rolls while the result is below `min`, so
/// the lower tail is redrawn rather than clamped. After [`MAX_BATCH_DRAWS`]
/// rejected draws the batch falls back to `min`.
pub fn sample_batch_size(random: &dyn RandomSource, min: u32, max: u32) -> u32 {
    for _ in 0..MAX_BATCH_DRAWS {
        let count = (random.next_unit() * f64::from(max)).round() as u32;
        if count >= min {
            return count.min(max);
        }
    }
    min
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sources::{ScriptedRandom, StdRandom};

    #[test]
    fn test_uniform_index_bounds() {
        assert_eq!(uniform_index(0.0, 21), 0);
        assert_eq!(uniform_index(0.999_999, 21), 20);
        assert_eq!(uniform_index(1.0, 21), 20);
        assert_eq!(uniform_index(0.5, 2), 1);
        assert_eq!(uniform_index(0.49, 2), 0);
    }

    #[test]
    fn test_catalog_names_are_distinct() {
        let mut names = PRODUCT_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PRODUCT_NAMES.len());
    }

    #[test]
    fn test_batch_size_rerolls_lower_tail() {
        // 0.1 * 20 = 2 (rejected), 0.1 again (rejected), 0.4 * 20 = 8
        let random = ScriptedRandom::new(vec![0.1, 0.1, 0.4]);
        assert_eq!(sample_batch_size(&random, 5, 20), 8);
        assert_eq!(random.draws(), 3);
    }

    #[test]
    fn test_batch_size_gives_up_after_bounded_draws() {
        let random = ScriptedRandom::new(vec![0.0]);
        assert_eq!(sample_batch_size(&random, 5, 20), 5);
        assert_eq!(random.draws(), MAX_BATCH_DRAWS);
    }

    #[test]
    fn test_batch_size_always_in_range() {
        let random = StdRandom::seeded(42);
        for _ in 0..2_000 {
            let n = sample_batch_size(&random, 5, 20);
            assert!((5..=20).contains(&n), "batch size {n} out of range");
        }
    }

    #[test]
    fn test_markup_factor_range() {
        let random = ScriptedRandom::new(vec![0.0, 0.999_999, 0.5]);
        assert_eq!(sample_markup_factor(&random, 500), 0);
        assert_eq!(sample_markup_factor(&random, 500), 500);
        assert_eq!(sample_markup_factor(&random, 500), 250);
    }

    #[test]
    fn test_product_draws_follow_script() {
        let random = ScriptedRandom::new(vec![0.0, 0.2, 0.99]);
        assert_eq!(sample_product_name(&random), PRODUCT_NAMES[0]);
        assert_eq!(sample_product_type(&random), ProductType::Chocolate);
        assert_eq!(sample_product_name(&random), PRODUCT_NAMES[20]);
    }
}
