//! Reward generation for a settled window of idle time
use rand::Rng;

use crate::catalog::{BaseRewards, CollectCatalog};
use crate::constants::{
    EQUIPMENT_IDS, MATERIAL_IDS, MAX_ACCRUAL_HOURS, YIELD_JITTER_MAX, YIELD_JITTER_MIN,
};
use crate::mode::CollectMode;
use crate::numbers::{floor_f64_to_u64, ms_to_hours, u64_to_f64, u64_to_usize};
use crate::rewards::{EquipmentDrop, RewardBundle};

/// Hours credited for the window `[from_ms, to_ms]`, capped at the accrual limit.
/// A window that runs backwards credits nothing.
#[must_use]
pub fn elapsed_hours(from_ms: u64, to_ms: u64) -> f64 {
    ms_to_hours(to_ms.saturating_sub(from_ms)).min(MAX_ACCRUAL_HOURS)
}

fn yield_jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(YIELD_JITTER_MIN..YIELD_JITTER_MAX)
}

/// Whole drops plus one Bernoulli trial for the fractional remainder.
fn roll_drop_count<R: Rng + ?Sized>(expected: f64, rng: &mut R) -> u64 {
    if !expected.is_finite() || expected <= 0.0 {
        return 0;
    }
    let whole = floor_f64_to_u64(expected);
    let remainder = expected - u64_to_f64(whole);
    let bonus = u64::from(remainder > 0.0 && rng.r#gen::<f64>() < remainder);
    whole.saturating_add(bonus)
}

/// Generate the rewards earned over `hours` at a location with the given base rates.
///
/// Gold and exp each take a single jitter draw for the whole window. Material
/// drops stack by id; equipment drops stay distinct. Drop ids with no item
/// template are skipped.
pub fn generate_rewards<C, R>(
    catalog: &C,
    base: &BaseRewards,
    mode: CollectMode,
    hours: f64,
    rng: &mut R,
) -> RewardBundle
where
    C: CollectCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let mut bundle = RewardBundle::new();
    if !hours.is_finite() || hours <= 0.0 {
        return bundle;
    }
    let mult = mode.multipliers();

    bundle.gold = floor_f64_to_u64(base.gold_per_hour() * hours * mult.gold * yield_jitter(rng));
    bundle.exp = floor_f64_to_u64(base.exp_per_hour() * hours * mult.exp * yield_jitter(rng));

    let material_drops =
        roll_drop_count(base.material_drop_chance * mult.material * hours, rng);
    for _ in 0..u64_to_usize(material_drops) {
        let item_id = MATERIAL_IDS[rng.gen_range(0..MATERIAL_IDS.len())];
        match catalog.resolve_item_template(item_id) {
            Some(template) => bundle.add_material(item_id, &template.name, 1),
            None => log::debug!("skipping material drop with no template: {item_id}"),
        }
    }

    let equipment_drops =
        roll_drop_count(base.equipment_drop_chance * mult.equipment * hours, rng);
    for _ in 0..u64_to_usize(equipment_drops) {
        let item_id = EQUIPMENT_IDS[rng.gen_range(0..EQUIPMENT_IDS.len())];
        match catalog.resolve_item_template(item_id) {
            Some(template) => bundle.push_equipment(EquipmentDrop {
                item_id: item_id.to_string(),
                name: template.name.clone(),
                rarity: template.rarity,
            }),
            None => log::debug!("skipping equipment drop with no template: {item_id}"),
        }
    }

    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemCatalog, LocationCatalog, StaticCatalog};
    use crate::constants::MS_PER_HOUR;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn base(gold: (u32, u32), exp: (u32, u32), material: f64, equipment: f64) -> BaseRewards {
        BaseRewards {
            gold_min: gold.0,
            gold_max: gold.1,
            exp_min: exp.0,
            exp_max: exp.1,
            material_drop_chance: material,
            equipment_drop_chance: equipment,
        }
    }

    #[test]
    fn elapsed_hours_caps_and_clamps() {
        assert!((elapsed_hours(0, 2 * MS_PER_HOUR) - 2.0).abs() < f64::EPSILON);
        assert!((elapsed_hours(0, 100 * MS_PER_HOUR) - 24.0).abs() < f64::EPSILON);
        assert!(elapsed_hours(5_000, 1_000).abs() < f64::EPSILON);
    }

    #[test]
    fn balanced_two_hour_gold_within_jitter_bounds() {
        let catalog = StaticCatalog::default_config();
        let rates = base((10, 20), (5, 10), 0.0, 0.0);
        for seed in 0..64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let bundle = generate_rewards(catalog, &rates, CollectMode::Balanced, 2.0, &mut rng);
            assert!((32..=39).contains(&bundle.gold), "gold {} out of range", bundle.gold);
            assert!(bundle.materials.is_empty());
            assert!(bundle.equipments.is_empty());
        }
    }

    #[test]
    fn drop_count_resolves_fraction_with_single_trial() {
        for seed in 0..64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let count = roll_drop_count(2.25, &mut rng);
            assert!(count == 2 || count == 3);
        }
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(roll_drop_count(4.0, &mut rng), 4);
        assert_eq!(roll_drop_count(0.0, &mut rng), 0);
        assert_eq!(roll_drop_count(-1.0, &mut rng), 0);
    }

    #[test]
    fn whole_drop_rates_produce_exact_counts() {
        let catalog = StaticCatalog::default_config();
        // 2.0 drops/h * 1.5 gather * 2h = 6 materials, 1.0 * 1.0 * 2h = 2 equipment
        let rates = base((0, 0), (0, 0), 2.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(9);
        let bundle = generate_rewards(catalog, &rates, CollectMode::Gather, 2.0, &mut rng);
        assert_eq!(bundle.material_units(), 6);
        assert_eq!(bundle.equipments.len(), 2);
        assert_eq!(bundle.gold, 0);

        let mut ids: Vec<_> = bundle.materials.iter().map(|m| m.item_id.clone()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before, "material ids must be unique");

        for drop in &bundle.equipments {
            let template = catalog.resolve_item_template(&drop.item_id).unwrap();
            assert_eq!(drop.rarity, template.rarity);
            assert_eq!(drop.name, template.name);
        }
    }

    #[test]
    fn missing_templates_are_skipped() {
        let catalog = StaticCatalog::new(LocationCatalog::default(), ItemCatalog::default());
        let rates = base((10, 10), (10, 10), 3.0, 3.0);
        let mut rng = SmallRng::seed_from_u64(3);
        let bundle = generate_rewards(&catalog, &rates, CollectMode::Combat, 1.0, &mut rng);
        assert!(bundle.materials.is_empty());
        assert!(bundle.equipments.is_empty());
        assert!(bundle.gold > 0);
    }

    #[test]
    fn zero_hours_yield_nothing() {
        let catalog = StaticCatalog::default_config();
        let rates = base((10, 20), (5, 10), 5.0, 5.0);
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(generate_rewards(catalog, &rates, CollectMode::Balanced, 0.0, &mut rng).is_empty());
    }
}
