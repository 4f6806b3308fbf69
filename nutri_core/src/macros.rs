//! Macro target resolution.
//!
//! Converts protein/carbohydrate/fat targets expressed in grams, grams per
//! kg of body weight, or kcal into absolute grams. Carbohydrate can instead be
//! back-filled from whatever energy the calorie target leaves after protein
//! and fat; the caller decides which mode is active.

use crate::{
    MacroTarget, MacroUnitMode, NutrientProfile, KCAL_PER_GRAM_CARBOHYDRATE, KCAL_PER_GRAM_FAT,
    KCAL_PER_GRAM_PROTEIN,
};
use serde::{Deserialize, Serialize};

/// Grams for a single macro target
///
/// `GramsPerKgBodyWeight` with no known body weight resolves to `0.0`.
pub fn resolve_macro_grams(
    target: &MacroTarget,
    body_weight_kg: f64,
    _calorie_target_kcal: f64,
    kcal_per_gram: f64,
) -> f64 {
    match target.mode {
        MacroUnitMode::GramsAbsolute => target.value,
        MacroUnitMode::GramsPerKgBodyWeight => {
            if body_weight_kg <= 0.0 {
                0.0
            } else {
                target.value * body_weight_kg
            }
        }
        MacroUnitMode::KcalAbsolute => {
            if kcal_per_gram <= 0.0 {
                0.0
            } else {
                target.value / kcal_per_gram
            }
        }
    }
}

/// Carbohydrate grams left over once protein and fat are paid for
///
/// Not clamped: a negative result means protein and fat already exceed the
/// calorie target.
pub fn remainder_carb_grams(calorie_target_kcal: f64, protein_g: f64, fat_g: f64) -> f64 {
    (calorie_target_kcal - protein_g * KCAL_PER_GRAM_PROTEIN - fat_g * KCAL_PER_GRAM_FAT)
        / KCAL_PER_GRAM_CARBOHYDRATE
}

/// How the carbohydrate target is derived
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CarbohydrateMode {
    /// An explicit target, resolved like protein and fat
    Explicit { target: MacroTarget },
    /// Whatever the calorie target leaves after protein and fat
    Remainder,
}

/// Targets for all three macros as configured by the caller
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MacroPlanTargets {
    pub protein: MacroTarget,
    pub fat: MacroTarget,
    pub carbohydrate: CarbohydrateMode,
}

/// Resolved macro targets in grams
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct MacroGrams {
    pub protein_g: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
}

impl MacroGrams {
    /// kcal implied by these grams
    pub fn energy_kcal(&self) -> f64 {
        self.protein_g * KCAL_PER_GRAM_PROTEIN
            + self.carbohydrate_g * KCAL_PER_GRAM_CARBOHYDRATE
            + self.fat_g * KCAL_PER_GRAM_FAT
    }

    /// True when a back-filled carbohydrate target came out negative
    pub fn is_over_allocated(&self) -> bool {
        self.carbohydrate_g < 0.0
    }
}

/// Resolve protein, fat and carbohydrate to grams
pub fn resolve_macro_targets(
    targets: &MacroPlanTargets,
    body_weight_kg: f64,
    calorie_target_kcal: f64,
) -> MacroGrams {
    let protein_g = resolve_macro_grams(
        &targets.protein,
        body_weight_kg,
        calorie_target_kcal,
        KCAL_PER_GRAM_PROTEIN,
    );
    let fat_g = resolve_macro_grams(
        &targets.fat,
        body_weight_kg,
        calorie_target_kcal,
        KCAL_PER_GRAM_FAT,
    );
    let carbohydrate_g = match &targets.carbohydrate {
        CarbohydrateMode::Explicit { target } => resolve_macro_grams(
            target,
            body_weight_kg,
            calorie_target_kcal,
            KCAL_PER_GRAM_CARBOHYDRATE,
        ),
        CarbohydrateMode::Remainder => remainder_carb_grams(calorie_target_kcal, protein_g, fat_g),
    };

    let grams = MacroGrams {
        protein_g,
        carbohydrate_g,
        fat_g,
    };
    if grams.is_over_allocated() {
        tracing::warn!(
            "Protein and fat exceed the calorie target of {:.0} kcal; carbohydrate remainder is {:.1} g",
            calorie_target_kcal,
            carbohydrate_g
        );
    }
    grams
}

/// Target vs actual for one nutrient
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct NutrientComparison {
    pub target: f64,
    pub actual: f64,
    /// `actual - target`
    pub difference: f64,
    /// `actual / target × 100`, `None` when the target is zero
    pub percent_of_target: Option<f64>,
}

impl NutrientComparison {
    pub fn new(target: f64, actual: f64) -> Self {
        Self {
            target,
            actual,
            difference: actual - target,
            percent_of_target: (target != 0.0).then(|| actual / target * 100.0),
        }
    }
}

/// Actual plan totals compared with resolved targets
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct TargetComparison {
    pub energy: NutrientComparison,
    pub protein: NutrientComparison,
    pub carbohydrate: NutrientComparison,
    pub fat: NutrientComparison,
}

pub fn compare_to_targets(
    actual: &NutrientProfile,
    calorie_target_kcal: f64,
    targets: &MacroGrams,
) -> TargetComparison {
    TargetComparison {
        energy: NutrientComparison::new(calorie_target_kcal, actual.energy_kcal),
        protein: NutrientComparison::new(targets.protein_g, actual.protein_g),
        carbohydrate: NutrientComparison::new(targets.carbohydrate_g, actual.carbohydrate_g),
        fat: NutrientComparison::new(targets.fat_g, actual.fat_g),
    }
}
