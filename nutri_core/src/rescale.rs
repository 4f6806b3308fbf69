//! Proportional meal-plan rescaling.
//!
//! Every food quantity in the plan is multiplied by the same factor, so the
//! plan's total energy moves by the requested amount while the macro ratios
//! (grams of each macro per kcal) stay the same. Quantities are rounded to
//! two decimal places.

use crate::aggregate::aggregate_plan;
use crate::catalog::FoodLookup;
use crate::{Error, MealPlan, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether `value` is a percentage or a kcal amount
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMode {
    Percent,
    Absolute,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

/// Requested change to a plan's total energy
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RescaleAdjustment {
    pub mode: AdjustmentMode,
    pub direction: AdjustmentDirection,
    pub value: f64,
}

impl RescaleAdjustment {
    pub fn percent(direction: AdjustmentDirection, value: f64) -> Self {
        Self {
            mode: AdjustmentMode::Percent,
            direction,
            value,
        }
    }

    pub fn absolute(direction: AdjustmentDirection, value: f64) -> Self {
        Self {
            mode: AdjustmentMode::Absolute,
            direction,
            value,
        }
    }
}

/// What to do with the rescaled quantities
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RescalePolicy {
    /// Keep the original and produce a new plan version
    #[default]
    NewVersion,
    /// Replace the original plan's quantities
    Overwrite,
}

/// Result of [`apply_rescale`]
#[derive(Clone, Debug, PartialEq)]
pub enum RescaleOutcome {
    /// The new version; the input plan is unchanged
    NewVersion(MealPlan),
    /// The input plan was modified in place
    Overwritten { factor: f64 },
}

/// Multiplicative factor that moves `original_kcal` as requested
pub fn rescale_factor(original_kcal: f64, adjustment: &RescaleAdjustment) -> Result<f64> {
    if original_kcal == 0.0 {
        return Err(Error::InvalidAdjustment(
            "plan has no energy to rescale".into(),
        ));
    }

    let factor = match (adjustment.mode, adjustment.direction) {
        (AdjustmentMode::Percent, AdjustmentDirection::Increase) => 1.0 + adjustment.value / 100.0,
        (AdjustmentMode::Percent, AdjustmentDirection::Decrease) => 1.0 - adjustment.value / 100.0,
        (AdjustmentMode::Absolute, AdjustmentDirection::Increase) => {
            (original_kcal + adjustment.value) / original_kcal
        }
        (AdjustmentMode::Absolute, AdjustmentDirection::Decrease) => {
            (original_kcal - adjustment.value) / original_kcal
        }
    };

    if !factor.is_finite() || factor <= 0.0 {
        return Err(Error::InvalidAdjustment(format!(
            "{:?} {:?} of {} gives scale factor {}",
            adjustment.direction, adjustment.mode, adjustment.value, factor
        )));
    }

    Ok(factor)
}

fn round_quantity(quantity: f64) -> f64 {
    (quantity * 100.0).round() / 100.0
}

fn scale_quantities(plan: &mut MealPlan, factor: f64) {
    for entry in plan.meals.iter_mut().flat_map(|m| m.entries.iter_mut()) {
        entry.quantity = round_quantity(entry.quantity * factor);
    }
}

/// Compute the scale factor for `plan` under `adjustment`
fn plan_factor<L: FoodLookup + ?Sized>(
    plan: &MealPlan,
    adjustment: &RescaleAdjustment,
    lookup: &L,
) -> Result<f64> {
    let original = aggregate_plan(plan, lookup)?;
    let factor = rescale_factor(original.energy_kcal, adjustment)?;
    tracing::info!(
        "Rescaling plan '{}' from {:.1} kcal by factor {:.4}",
        plan.name,
        original.energy_kcal,
        factor
    );
    Ok(factor)
}

/// Copy of `plan` with every quantity scaled
///
/// Meals, food IDs, ordering and plan identity are preserved; only
/// quantities change.
pub fn rescale_plan<L: FoodLookup + ?Sized>(
    plan: &MealPlan,
    adjustment: &RescaleAdjustment,
    lookup: &L,
) -> Result<MealPlan> {
    let factor = plan_factor(plan, adjustment, lookup)?;
    let mut scaled = plan.clone();
    scale_quantities(&mut scaled, factor);
    Ok(scaled)
}

/// Rescale according to the caller's persistence policy
///
/// `NewVersion` leaves `plan` untouched and returns a copy with a fresh ID
/// that records the plan it was derived from. `Overwrite` scales `plan` in
/// place. On error `plan` is never modified.
pub fn apply_rescale<L: FoodLookup + ?Sized>(
    plan: &mut MealPlan,
    adjustment: &RescaleAdjustment,
    lookup: &L,
    policy: RescalePolicy,
) -> Result<RescaleOutcome> {
    let factor = plan_factor(plan, adjustment, lookup)?;
    match policy {
        RescalePolicy::Overwrite => {
            scale_quantities(plan, factor);
            Ok(RescaleOutcome::Overwritten { factor })
        }
        RescalePolicy::NewVersion => {
            let mut version = plan.clone();
            scale_quantities(&mut version, factor);
            version.id = Uuid::new_v4();
            version.derived_from = Some(plan.id);
            version.locked = false;
            Ok(RescaleOutcome::NewVersion(version))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_plan;
    use crate::catalog::reference_catalog;
    use crate::{FoodEntry, Meal, NutrientProfile};
    use chrono::NaiveDate;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    fn sample_plan() -> MealPlan {
        let mut plan = MealPlan::new(
            "client-7",
            "Lean bulk",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        plan.meals = vec![
            Meal::new("Breakfast")
                .with_entry(FoodEntry::new("rolled_oats", 80.0, "g"))
                .with_entry(FoodEntry::new("whole_milk", 250.0, "ml"))
                .with_entry(FoodEntry::new("egg_whole", 3.0, "unit")),
            Meal::new("Lunch")
                .with_entry(FoodEntry::new("chicken_breast_grilled", 180.0, "g"))
                .with_entry(FoodEntry::new("white_rice_cooked", 250.0, "g"))
                .with_entry(FoodEntry::new("black_beans_cooked", 120.0, "g"))
                .with_entry(FoodEntry::new("olive_oil", 12.5, "ml")),
            Meal::new("Snack").with_entry(FoodEntry::new("banana", 2.0, "unit")),
        ];
        plan
    }

    fn quantities(plan: &MealPlan) -> Vec<f64> {
        plan.meals
            .iter()
            .flat_map(|m| m.entries.iter().map(|e| e.quantity))
            .collect()
    }

    fn ratio(part: f64, totals: &NutrientProfile) -> f64 {
        part / totals.energy_kcal
    }

    #[test]
    fn test_percent_factors() {
        let up = RescaleAdjustment::percent(AdjustmentDirection::Increase, 10.0);
        let down = RescaleAdjustment::percent(AdjustmentDirection::Decrease, 25.0);
        assert!(approx_eq(rescale_factor(2000.0, &up).unwrap(), 1.1, 1e-12));
        assert!(approx_eq(rescale_factor(2000.0, &down).unwrap(), 0.75, 1e-12));
    }

    #[test]
    fn test_absolute_factors() {
        let up = RescaleAdjustment::absolute(AdjustmentDirection::Increase, 500.0);
        let down = RescaleAdjustment::absolute(AdjustmentDirection::Decrease, 500.0);
        assert!(approx_eq(rescale_factor(2000.0, &up).unwrap(), 1.25, 1e-12));
        assert!(approx_eq(rescale_factor(2000.0, &down).unwrap(), 0.75, 1e-12));
    }

    #[test]
    fn test_non_positive_factor_rejected() {
        let all = RescaleAdjustment::percent(AdjustmentDirection::Decrease, 100.0);
        assert!(matches!(
            rescale_factor(2000.0, &all),
            Err(Error::InvalidAdjustment(_))
        ));

        let too_much = RescaleAdjustment::absolute(AdjustmentDirection::Decrease, 2500.0);
        assert!(matches!(
            rescale_factor(2000.0, &too_much),
            Err(Error::InvalidAdjustment(_))
        ));
    }

    #[test]
    fn test_zero_kcal_plan_rejected() {
        let empty = MealPlan::with_canonical_meals(
            "client-7",
            "Empty",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        let adj = RescaleAdjustment::percent(AdjustmentDirection::Increase, 10.0);
        assert!(matches!(
            rescale_plan(&empty, &adj, reference_catalog()),
            Err(Error::InvalidAdjustment(_))
        ));
    }

    #[test]
    fn test_zero_percent_is_identity() {
        let plan = sample_plan();
        let adj = RescaleAdjustment::percent(AdjustmentDirection::Increase, 0.0);
        let scaled = rescale_plan(&plan, &adj, reference_catalog()).unwrap();
        assert_eq!(quantities(&scaled), quantities(&plan));
        assert_eq!(scaled, plan);
    }

    #[test]
    fn test_structure_preserved_and_quantities_rounded() {
        let plan = sample_plan();
        let adj = RescaleAdjustment::percent(AdjustmentDirection::Increase, 7.0);
        let scaled = rescale_plan(&plan, &adj, reference_catalog()).unwrap();

        assert_eq!(scaled.id, plan.id);
        assert_eq!(scaled.meals.len(), plan.meals.len());
        for (a, b) in plan.meals.iter().zip(&scaled.meals) {
            assert_eq!(a.name, b.name);
            let ids_a: Vec<_> = a.entries.iter().map(|e| &e.food_id).collect();
            let ids_b: Vec<_> = b.entries.iter().map(|e| &e.food_id).collect();
            assert_eq!(ids_a, ids_b);
        }

        // 12.5 × 1.07 = 13.375 → 13.38
        let oil = &scaled.meals[1].entries[3];
        assert!(approx_eq(oil.quantity, 13.38, 1e-9));
        for q in quantities(&scaled) {
            assert!(approx_eq(q * 100.0, (q * 100.0).round(), 1e-6));
        }
    }

    #[test]
    fn test_inverse_rescale_restores_energy() {
        let plan = sample_plan();
        let catalog = reference_catalog();
        let original = aggregate_plan(&plan, catalog).unwrap();

        // +25% then -20% is the exact inverse
        let up = RescaleAdjustment::percent(AdjustmentDirection::Increase, 25.0);
        let down = RescaleAdjustment::percent(AdjustmentDirection::Decrease, 20.0);
        let round_trip =
            rescale_plan(&rescale_plan(&plan, &up, catalog).unwrap(), &down, catalog).unwrap();
        let restored = aggregate_plan(&round_trip, catalog).unwrap();
        assert!(approx_eq(restored.energy_kcal, original.energy_kcal, 1.0));

        // +X% then -X% lands within (X/100)² of the original
        let up = RescaleAdjustment::percent(AdjustmentDirection::Increase, 10.0);
        let down = RescaleAdjustment::percent(AdjustmentDirection::Decrease, 10.0);
        let round_trip =
            rescale_plan(&rescale_plan(&plan, &up, catalog).unwrap(), &down, catalog).unwrap();
        let restored = aggregate_plan(&round_trip, catalog).unwrap();
        assert!(approx_eq(
            restored.energy_kcal / original.energy_kcal,
            0.99,
            0.001
        ));
    }

    #[test]
    fn test_macro_ratios_preserved() {
        let plan = sample_plan();
        let catalog = reference_catalog();
        let before = aggregate_plan(&plan, catalog).unwrap();

        for adj in [
            RescaleAdjustment::percent(AdjustmentDirection::Increase, 15.0),
            RescaleAdjustment::percent(AdjustmentDirection::Decrease, 30.0),
            RescaleAdjustment::absolute(AdjustmentDirection::Decrease, 400.0),
        ] {
            let after = aggregate_plan(&rescale_plan(&plan, &adj, catalog).unwrap(), catalog)
                .unwrap();
            assert!(approx_eq(ratio(after.protein_g, &after), ratio(before.protein_g, &before), 1e-4));
            assert!(approx_eq(
                ratio(after.carbohydrate_g, &after),
                ratio(before.carbohydrate_g, &before),
                1e-4
            ));
            assert!(approx_eq(ratio(after.fat_g, &after), ratio(before.fat_g, &before), 1e-4));
        }
    }

    #[test]
    fn test_absolute_rescale_hits_target() {
        let plan = sample_plan();
        let catalog = reference_catalog();
        let before = aggregate_plan(&plan, catalog).unwrap();

        let adj = RescaleAdjustment::absolute(AdjustmentDirection::Increase, 300.0);
        let after = aggregate_plan(&rescale_plan(&plan, &adj, catalog).unwrap(), catalog).unwrap();
        assert!(approx_eq(after.energy_kcal, before.energy_kcal + 300.0, 2.0));
    }

    #[test]
    fn test_new_version_policy_leaves_original() {
        let mut plan = sample_plan();
        let before = plan.clone();
        let adj = RescaleAdjustment::percent(AdjustmentDirection::Decrease, 10.0);

        let outcome =
            apply_rescale(&mut plan, &adj, reference_catalog(), RescalePolicy::NewVersion).unwrap();

        assert_eq!(plan, before);
        match outcome {
            RescaleOutcome::NewVersion(version) => {
                assert_ne!(version.id, plan.id);
                assert_eq!(version.derived_from, Some(plan.id));
                assert!(approx_eq(version.meals[0].entries[0].quantity, 72.0, 1e-9));
            }
            other => panic!("Expected NewVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_overwrite_policy_mutates_in_place() {
        let mut plan = sample_plan();
        let id = plan.id;
        let adj = RescaleAdjustment::percent(AdjustmentDirection::Increase, 50.0);

        let outcome =
            apply_rescale(&mut plan, &adj, reference_catalog(), RescalePolicy::Overwrite).unwrap();

        assert!(matches!(outcome, RescaleOutcome::Overwritten { .. }));
        assert_eq!(plan.id, id);
        assert_eq!(plan.meals[0].entries[0].quantity, 120.0);
        assert_eq!(plan.meals[2].entries[0].quantity, 3.0);
    }

    #[test]
    fn test_failed_overwrite_leaves_plan_untouched() {
        let mut plan = sample_plan();
        let before = plan.clone();
        let adj = RescaleAdjustment::percent(AdjustmentDirection::Decrease, 120.0);

        assert!(apply_rescale(&mut plan, &adj, reference_catalog(), RescalePolicy::Overwrite)
            .is_err());
        assert_eq!(plan, before);
    }
}
