//! Energy expenditure: basal metabolic rate, daily expenditure and calorie target.
//!
//! Formulas:
//! - Harris-Benedict (1919): sex-specific intercepts and coefficients
//! - Mifflin-St Jeor (1990): `10W + 6.25H - 5A + 5` (men) / `- 161` (women)
//! - Katch-McArdle: `370 + 21.6 × LM`
//! - Cunningham: `500 + 22 × LM`
//! - Tinsley (fat-free mass variant): `284 + 25.9 × LM`
//! - Pocket formula: `W × kcal/kg`
//!
//! `LM` is lean mass, derived from body fat when known and estimated as 85%
//! of body weight otherwise.
//!
//! A BMR that cannot be computed (weight, height or age missing) is reported
//! as `None` by [`try_basal_metabolic_rate`] and as `0.0` by
//! [`basal_metabolic_rate`].

use crate::{BmrFormula, BodyMeasurements, EnergyGoal, GoalDirection, Sex};
use serde::{Deserialize, Serialize};

/// Default kcal per kg for the pocket formula
pub const DEFAULT_POCKET_KCAL_PER_KG: f64 = 25.0;

/// Lean mass fraction assumed when body fat is unknown
pub const ESTIMATED_LEAN_FRACTION: f64 = 0.85;

mod harris_benedict {
    pub const MALE: [f64; 4] = [66.47, 13.75, 5.003, 6.755];
    pub const FEMALE: [f64; 4] = [655.1, 9.563, 1.850, 4.676];
}

mod mifflin {
    pub const WEIGHT: f64 = 10.0;
    pub const HEIGHT: f64 = 6.25;
    pub const AGE: f64 = 5.0;
    pub const MALE: f64 = 5.0;
    pub const FEMALE: f64 = -161.0;
}

/// Lean body mass in kg
///
/// Uses `weight × (1 - bf/100)` when `body_fat_percent > 0`, otherwise
/// `0.85 × weight`.
pub fn lean_mass(weight_kg: f64, body_fat_percent: Option<f64>) -> f64 {
    match body_fat_percent {
        Some(bf) if bf > 0.0 => weight_kg * (1.0 - bf / 100.0),
        _ => weight_kg * ESTIMATED_LEAN_FRACTION,
    }
}

/// Basal metabolic rate in kcal/day, or `None` when it cannot be computed
///
/// Weight, height and age are required for every formula. A body fat of
/// 100% or more leaves no lean mass and is also not computable.
pub fn try_basal_metabolic_rate(
    formula: BmrFormula,
    sex: Sex,
    weight_kg: f64,
    height_cm: f64,
    age_years: f64,
    body_fat_percent: Option<f64>,
    kcal_per_kg: Option<f64>,
) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 || age_years <= 0.0 {
        return None;
    }
    if formula.uses_lean_mass() && body_fat_percent.is_some_and(|bf| bf >= 100.0) {
        return None;
    }

    let bmr = match formula {
        BmrFormula::HarrisBenedict => {
            let [base, w, h, a] = match sex {
                Sex::Male => harris_benedict::MALE,
                Sex::Female => harris_benedict::FEMALE,
            };
            base + w * weight_kg + h * height_cm - a * age_years
        }
        BmrFormula::MifflinStJeor => {
            let constant = match sex {
                Sex::Male => mifflin::MALE,
                Sex::Female => mifflin::FEMALE,
            };
            mifflin::WEIGHT * weight_kg + mifflin::HEIGHT * height_cm - mifflin::AGE * age_years
                + constant
        }
        BmrFormula::KatchMcArdle => 370.0 + 21.6 * lean_mass(weight_kg, body_fat_percent),
        BmrFormula::Cunningham => 500.0 + 22.0 * lean_mass(weight_kg, body_fat_percent),
        BmrFormula::Tinsley => 284.0 + 25.9 * lean_mass(weight_kg, body_fat_percent),
        BmrFormula::Pocket => weight_kg * kcal_per_kg.unwrap_or(DEFAULT_POCKET_KCAL_PER_KG),
    };

    tracing::debug!("BMR ({:?}, {:?}): {:.1} kcal", formula, sex, bmr);
    Some(bmr)
}

/// Basal metabolic rate in kcal/day
///
/// Returns `0.0` when the inputs are insufficient; callers must read `0.0`
/// as "not computable yet", not as a real BMR.
pub fn basal_metabolic_rate(
    formula: BmrFormula,
    sex: Sex,
    weight_kg: f64,
    height_cm: f64,
    age_years: f64,
    body_fat_percent: Option<f64>,
    kcal_per_kg: Option<f64>,
) -> f64 {
    try_basal_metabolic_rate(
        formula,
        sex,
        weight_kg,
        height_cm,
        age_years,
        body_fat_percent,
        kcal_per_kg,
    )
    .unwrap_or(0.0)
}

/// TDEE = BMR × activity factor + extra activity kcal
pub fn total_daily_expenditure(bmr: f64, activity_factor: f64, extra_kcal: f64) -> f64 {
    bmr * activity_factor + extra_kcal
}

/// Daily calorie target for a goal
///
/// No lower bound is applied; a large deficit can produce an implausibly
/// low (or negative) target.
pub fn calorie_target(expenditure: f64, goal: EnergyGoal) -> f64 {
    match goal.direction {
        GoalDirection::Maintenance => expenditure,
        GoalDirection::Deficit => expenditure - goal.adjustment_kcal,
        GoalDirection::Surplus => expenditure + goal.adjustment_kcal,
    }
}

/// Activity factor presets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// 1-3 days/week
    LightlyActive,
    /// 3-5 days/week
    ModeratelyActive,
    /// 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

/// BMR, TDEE and calorie target computed together
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBudget {
    pub bmr: f64,
    pub tdee: f64,
    pub target_kcal: f64,
}

/// Inputs for [`energy_budget`] beyond the client's measurements
#[derive(Debug, Clone, Copy)]
pub struct EnergyParameters {
    pub formula: BmrFormula,
    pub kcal_per_kg: Option<f64>,
    pub activity_factor: f64,
    pub extra_kcal: f64,
    pub goal: EnergyGoal,
}

/// Chain BMR → TDEE → calorie target for a client
///
/// Returns `None` when the BMR is not computable.
pub fn energy_budget(body: &BodyMeasurements, params: &EnergyParameters) -> Option<EnergyBudget> {
    let bmr = try_basal_metabolic_rate(
        params.formula,
        body.sex,
        body.weight_kg,
        body.height_cm,
        body.age_years,
        body.body_fat_percent,
        params.kcal_per_kg,
    )?;
    let tdee = total_daily_expenditure(bmr, params.activity_factor, params.extra_kcal);
    Some(EnergyBudget {
        bmr,
        tdee,
        target_kcal: calorie_target(tdee, params.goal),
    })
}
