//! Core domain types for the nutrition calculation core.
//!
//! This module defines the fundamental types used throughout the system:
//! - Nutrient profiles and foods
//! - Food entries, meals and meal plans
//! - Energy goals and macro targets
//! - Client anthropometrics

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use uuid::Uuid;

/// Energy per gram of protein (kcal)
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;

/// Energy per gram of carbohydrate (kcal)
pub const KCAL_PER_GRAM_CARBOHYDRATE: f64 = 4.0;

/// Energy per gram of fat (kcal)
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

// ============================================================================
// Nutrient Types
// ============================================================================

/// Nutrient values for one reference portion of a food (or any scaled amount)
///
/// Micronutrients are an open set keyed by name (`fiber_g`, `sodium_mg`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub micronutrients: BTreeMap<String, f64>,
}

impl NutrientProfile {
    /// Profile with every value at zero
    pub fn zero() -> Self {
        Self::default()
    }

    /// Profile with the four headline values set and no micronutrients
    pub fn new(energy_kcal: f64, protein_g: f64, carbohydrate_g: f64, fat_g: f64) -> Self {
        Self {
            energy_kcal,
            protein_g,
            carbohydrate_g,
            fat_g,
            micronutrients: BTreeMap::new(),
        }
    }

    /// Builder-style helper for attaching a micronutrient
    pub fn with_micronutrient(mut self, name: impl Into<String>, value: f64) -> Self {
        self.micronutrients.insert(name.into(), value);
        self
    }

    /// Multiply every numeric field by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            energy_kcal: self.energy_kcal * factor,
            protein_g: self.protein_g * factor,
            carbohydrate_g: self.carbohydrate_g * factor,
            fat_g: self.fat_g * factor,
            micronutrients: self
                .micronutrients
                .iter()
                .map(|(name, value)| (name.clone(), value * factor))
                .collect(),
        }
    }

    /// Look up a micronutrient, treating an absent one as zero
    pub fn micronutrient(&self, name: &str) -> f64 {
        self.micronutrients.get(name).copied().unwrap_or(0.0)
    }

    /// True when no value is negative
    pub fn is_non_negative(&self) -> bool {
        self.energy_kcal >= 0.0
            && self.protein_g >= 0.0
            && self.carbohydrate_g >= 0.0
            && self.fat_g >= 0.0
            && self.micronutrients.values().all(|v| *v >= 0.0)
    }
}

impl AddAssign<&NutrientProfile> for NutrientProfile {
    fn add_assign(&mut self, other: &NutrientProfile) {
        self.energy_kcal += other.energy_kcal;
        self.protein_g += other.protein_g;
        self.carbohydrate_g += other.carbohydrate_g;
        self.fat_g += other.fat_g;
        for (name, value) in &other.micronutrients {
            *self.micronutrients.entry(name.clone()).or_insert(0.0) += value;
        }
    }
}

impl AddAssign for NutrientProfile {
    fn add_assign(&mut self, other: NutrientProfile) {
        *self += &other;
    }
}

impl Add for NutrientProfile {
    type Output = NutrientProfile;

    fn add(mut self, other: NutrientProfile) -> NutrientProfile {
        self += &other;
        self
    }
}

impl Sum for NutrientProfile {
    fn sum<I: Iterator<Item = NutrientProfile>>(iter: I) -> Self {
        iter.fold(NutrientProfile::zero(), |acc, p| acc + p)
    }
}

/// A catalog food with its per-reference-portion nutrient profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: String,
    pub name: String,
    /// Amount the profile is recorded for (e.g. 100 for "per 100 g")
    pub reference_portion: f64,
    /// Mass/volume/count label (`g`, `ml`, `unit`)
    pub unit: String,
    pub profile: NutrientProfile,
}

impl Food {
    /// Validate the catalog invariants for this food
    ///
    /// Returns a list of problems, or an empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.id.is_empty() {
            errors.push(format!("Food '{}' has empty ID", self.name));
        }
        if !(self.reference_portion.is_finite() && self.reference_portion > 0.0) {
            errors.push(format!(
                "Food '{}': reference portion {} must be positive",
                self.id, self.reference_portion
            ));
        }
        if !self.profile.is_non_negative() {
            errors.push(format!("Food '{}' has negative nutrient values", self.id));
        }
        errors
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// One food in a meal, with a caller-supplied quantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub food_id: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

impl FoodEntry {
    pub fn new(food_id: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            food_id: food_id.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

/// Canonical meal slots, in display order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    MorningSnack,
    Lunch,
    AfternoonSnack,
    Dinner,
    Supper,
}

impl MealSlot {
    /// All slots in canonical order
    pub const ALL: [MealSlot; 6] = [
        MealSlot::Breakfast,
        MealSlot::MorningSnack,
        MealSlot::Lunch,
        MealSlot::AfternoonSnack,
        MealSlot::Dinner,
        MealSlot::Supper,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::MorningSnack => "Morning snack",
            MealSlot::Lunch => "Lunch",
            MealSlot::AfternoonSnack => "Afternoon snack",
            MealSlot::Dinner => "Dinner",
            MealSlot::Supper => "Supper",
        }
    }

    /// Typical time of day for the slot
    pub fn default_time(&self) -> Option<NaiveTime> {
        let (h, m) = match self {
            MealSlot::Breakfast => (7, 0),
            MealSlot::MorningSnack => (10, 0),
            MealSlot::Lunch => (12, 30),
            MealSlot::AfternoonSnack => (16, 0),
            MealSlot::Dinner => (19, 30),
            MealSlot::Supper => (22, 0),
        };
        NaiveTime::from_hms_opt(h, m, 0)
    }
}

/// A named, time-stamped, ordered sequence of food entries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    #[serde(default)]
    pub slot: Option<MealSlot>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub entries: Vec<FoodEntry>,
}

impl Meal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: None,
            time: None,
            entries: Vec::new(),
        }
    }

    /// Empty meal for a canonical slot
    pub fn for_slot(slot: MealSlot) -> Self {
        Self {
            name: slot.label().to_string(),
            slot: Some(slot),
            time: slot.default_time(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: FoodEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// A client's meal plan
///
/// `locked` is carried for callers; nothing in the calculation core reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: Uuid,
    pub client_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub locked: bool,
    /// Plan this one was rescaled from, if any
    #[serde(default)]
    pub derived_from: Option<Uuid>,
}

impl MealPlan {
    pub fn new(client_id: impl Into<String>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: client_id.into(),
            name: name.into(),
            start_date,
            end_date: None,
            meals: Vec::new(),
            locked: false,
            derived_from: None,
        }
    }

    /// New plan initialized with one empty meal per canonical slot
    pub fn with_canonical_meals(
        client_id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        let mut plan = Self::new(client_id, name, start_date);
        plan.meals = MealSlot::ALL.iter().map(|s| Meal::for_slot(*s)).collect();
        plan
    }

    /// Total number of food entries across all meals
    pub fn entry_count(&self) -> usize {
        self.meals.iter().map(|m| m.entries.len()).sum()
    }

    /// Mutable access to the meal for a slot, if present
    pub fn meal_for_slot_mut(&mut self, slot: MealSlot) -> Option<&mut Meal> {
        self.meals.iter_mut().find(|m| m.slot == Some(slot))
    }
}

// ============================================================================
// Goal and Target Types
// ============================================================================

/// Direction of a calorie goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    Deficit,
    Surplus,
    #[default]
    Maintenance,
}

/// Calorie goal: a direction plus a daily kcal magnitude
///
/// The magnitude is ignored for `Maintenance`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct EnergyGoal {
    pub direction: GoalDirection,
    #[serde(default)]
    pub adjustment_kcal: f64,
}

impl EnergyGoal {
    pub fn maintenance() -> Self {
        Self {
            direction: GoalDirection::Maintenance,
            adjustment_kcal: 0.0,
        }
    }

    pub fn deficit(adjustment_kcal: f64) -> Self {
        Self {
            direction: GoalDirection::Deficit,
            adjustment_kcal,
        }
    }

    pub fn surplus(adjustment_kcal: f64) -> Self {
        Self {
            direction: GoalDirection::Surplus,
            adjustment_kcal,
        }
    }
}

/// How a macro target value is expressed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MacroUnitMode {
    GramsAbsolute,
    GramsPerKgBodyWeight,
    KcalAbsolute,
}

/// A target for one macro
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MacroTarget {
    pub value: f64,
    pub mode: MacroUnitMode,
}

impl MacroTarget {
    pub fn grams(value: f64) -> Self {
        Self {
            value,
            mode: MacroUnitMode::GramsAbsolute,
        }
    }

    pub fn grams_per_kg(value: f64) -> Self {
        Self {
            value,
            mode: MacroUnitMode::GramsPerKgBodyWeight,
        }
    }

    pub fn kcal(value: f64) -> Self {
        Self {
            value,
            mode: MacroUnitMode::KcalAbsolute,
        }
    }
}

// ============================================================================
// Client Types
// ============================================================================

/// Biological sex, used by the sex-specific BMR formulas
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Basal metabolic rate formula
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    HarrisBenedict,
    MifflinStJeor,
    KatchMcArdle,
    Cunningham,
    Tinsley,
    Pocket,
}

impl BmrFormula {
    pub const ALL: [BmrFormula; 6] = [
        BmrFormula::HarrisBenedict,
        BmrFormula::MifflinStJeor,
        BmrFormula::KatchMcArdle,
        BmrFormula::Cunningham,
        BmrFormula::Tinsley,
        BmrFormula::Pocket,
    ];

    /// Whether the formula is driven by lean body mass
    pub fn uses_lean_mass(&self) -> bool {
        matches!(
            self,
            BmrFormula::KatchMcArdle | BmrFormula::Cunningham | BmrFormula::Tinsley
        )
    }
}

/// Client anthropometrics, usually from the most recent clinical visit
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BodyMeasurements {
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    #[serde(default)]
    pub body_fat_percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_sum_carries_micronutrients() {
        let a = NutrientProfile::new(100.0, 10.0, 5.0, 2.0).with_micronutrient("fiber_g", 3.0);
        let b = NutrientProfile::new(50.0, 1.0, 10.0, 0.5).with_micronutrient("sodium_mg", 40.0);

        let total: NutrientProfile = vec![a, b].into_iter().sum();

        assert_eq!(total.energy_kcal, 150.0);
        assert_eq!(total.protein_g, 11.0);
        assert_eq!(total.micronutrient("fiber_g"), 3.0);
        assert_eq!(total.micronutrient("sodium_mg"), 40.0);
        assert_eq!(total.micronutrient("iron_mg"), 0.0);
    }

    #[test]
    fn test_scaled_includes_micronutrients() {
        let p = NutrientProfile::new(100.0, 10.0, 0.0, 4.0).with_micronutrient("fiber_g", 2.0);
        let s = p.scaled(1.5);
        assert_eq!(s.energy_kcal, 150.0);
        assert_eq!(s.fat_g, 6.0);
        assert_eq!(s.micronutrient("fiber_g"), 3.0);
    }

    #[test]
    fn test_food_validate_rejects_zero_portion() {
        let food = Food {
            id: "bad".into(),
            name: "Bad".into(),
            reference_portion: 0.0,
            unit: "g".into(),
            profile: NutrientProfile::new(10.0, 1.0, 1.0, 1.0),
        };
        assert_eq!(food.validate().len(), 1);
    }

    #[test]
    fn test_canonical_meals_order() {
        let plan = MealPlan::with_canonical_meals(
            "client-1",
            "Week 1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let slots: Vec<_> = plan.meals.iter().filter_map(|m| m.slot).collect();
        assert_eq!(slots, MealSlot::ALL.to_vec());
        assert_eq!(plan.meals[2].name, "Lunch");
        assert_eq!(plan.entry_count(), 0);
    }

    #[test]
    fn test_plan_json_roundtrip_uses_snake_case() {
        let mut plan = MealPlan::with_canonical_meals(
            "client-1",
            "Week 1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        plan.meals[0].entries.push(FoodEntry::new("oats", 40.0, "g"));

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"morning_snack\""));

        let parsed: MealPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, plan);
    }
}
