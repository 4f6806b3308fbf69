//! Nutrient aggregation across food entries, meals and plans.
//!
//! Every entry contributes its food's profile scaled by
//! `quantity / reference_portion`. Entries whose food cannot be resolved
//! contribute nothing; a resolved food with a non-positive reference portion
//! is a catalog integrity problem and fails the whole aggregation.

use crate::catalog::FoodLookup;
use crate::{
    Error, Food, FoodEntry, Meal, MealPlan, NutrientProfile, Result, KCAL_PER_GRAM_CARBOHYDRATE,
    KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN,
};
use serde::Serialize;

/// Scale a per-reference-portion profile to `quantity`
pub fn scale_nutrients(
    profile: &NutrientProfile,
    reference_portion: f64,
    quantity: f64,
) -> Result<NutrientProfile> {
    if !(reference_portion.is_finite() && reference_portion > 0.0) {
        return Err(Error::InvalidFoodDefinition {
            food_id: String::new(),
            reference_portion,
        });
    }
    Ok(profile.scaled(quantity / reference_portion))
}

/// Nutrients supplied by one entry of `food`
pub fn scale_entry(food: &Food, entry: &FoodEntry) -> Result<NutrientProfile> {
    scale_nutrients(&food.profile, food.reference_portion, entry.quantity).map_err(|e| match e {
        Error::InvalidFoodDefinition {
            reference_portion, ..
        } => Error::InvalidFoodDefinition {
            food_id: food.id.clone(),
            reference_portion,
        },
        other => other,
    })
}

/// Sum the scaled profiles of every resolvable entry
pub fn aggregate_entries<L: FoodLookup + ?Sized>(
    entries: &[FoodEntry],
    lookup: &L,
) -> Result<NutrientProfile> {
    let mut total = NutrientProfile::zero();
    for entry in entries {
        match lookup.food(&entry.food_id) {
            Some(food) => total += scale_entry(food, entry)?,
            None => {
                tracing::debug!("Skipping entry for unknown food '{}'", entry.food_id);
            }
        }
    }
    Ok(total)
}

/// Totals for one meal
pub fn aggregate_meal<L: FoodLookup + ?Sized>(meal: &Meal, lookup: &L) -> Result<NutrientProfile> {
    aggregate_entries(&meal.entries, lookup)
}

/// Totals for a whole plan (sum of its meals)
pub fn aggregate_plan<L: FoodLookup + ?Sized>(
    plan: &MealPlan,
    lookup: &L,
) -> Result<NutrientProfile> {
    plan.meals
        .iter()
        .map(|meal| aggregate_meal(meal, lookup))
        .sum()
}

/// Totals for one meal, labelled
#[derive(Clone, Debug, Serialize)]
pub struct MealTotals {
    pub name: String,
    pub totals: NutrientProfile,
}

/// Per-meal totals alongside the plan total
#[derive(Clone, Debug, Serialize)]
pub struct PlanBreakdown {
    pub meals: Vec<MealTotals>,
    pub totals: NutrientProfile,
}

/// Aggregate every meal once and derive the plan total from those results
pub fn plan_breakdown<L: FoodLookup + ?Sized>(plan: &MealPlan, lookup: &L) -> Result<PlanBreakdown> {
    let meals = plan
        .meals
        .iter()
        .map(|meal| {
            Ok(MealTotals {
                name: meal.name.clone(),
                totals: aggregate_meal(meal, lookup)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let totals = meals.iter().map(|m| m.totals.clone()).sum();

    Ok(PlanBreakdown { meals, totals })
}

/// Share of macro energy supplied by each macro, in percent
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnergyDistribution {
    pub protein_pct: f64,
    pub carbohydrate_pct: f64,
    pub fat_pct: f64,
}

/// Macro energy split of a profile, using 4/4/9 kcal per gram
///
/// Returns `None` when the profile has no macro energy.
pub fn energy_distribution(profile: &NutrientProfile) -> Option<EnergyDistribution> {
    let protein = profile.protein_g * KCAL_PER_GRAM_PROTEIN;
    let carbohydrate = profile.carbohydrate_g * KCAL_PER_GRAM_CARBOHYDRATE;
    let fat = profile.fat_g * KCAL_PER_GRAM_FAT;
    let total = protein + carbohydrate + fat;

    if total <= 0.0 {
        return None;
    }

    Some(EnergyDistribution {
        protein_pct: protein / total * 100.0,
        carbohydrate_pct: carbohydrate / total * 100.0,
        fat_pct: fat / total * 100.0,
    })
}
