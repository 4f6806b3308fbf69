//! Body-mass change projection from a sustained daily energy surplus/deficit.

use crate::{EnergyGoal, GoalDirection};
use chrono::NaiveDate;
use serde::Serialize;

/// kcal per kg of body-mass change used unless configured otherwise
pub const DEFAULT_ENERGY_PER_KG: f64 = 9900.0;

/// Commonly cited energy density of body fat (kcal/kg)
pub const CONVENTIONAL_ENERGY_PER_KG: f64 = 7700.0;

/// Expected change over a date range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightProjection {
    pub days: i64,
    /// Magnitude of the change, always non-negative
    pub projected_delta_kg: f64,
    pub projected_final_weight_kg: f64,
}

/// Project weight change between two dates
///
/// Returns `None` when `end` is not after `start`. The direction of the
/// change comes from `goal`; the sign of `daily_delta_kcal` is ignored.
/// `energy_per_kg` must be positive.
pub fn project_weight_change(
    start: NaiveDate,
    end: NaiveDate,
    daily_delta_kcal: f64,
    current_weight_kg: f64,
    goal: &EnergyGoal,
    energy_per_kg: f64,
) -> Option<WeightProjection> {
    let days = (end - start).num_days();
    if days <= 0 {
        tracing::debug!("No projection: {} is not after {}", end, start);
        return None;
    }
    if energy_per_kg <= 0.0 {
        tracing::warn!("Energy per kg must be positive, got {}", energy_per_kg);
        return None;
    }

    let total_delta_kcal = daily_delta_kcal * days as f64;
    let projected_delta_kg = total_delta_kcal.abs() / energy_per_kg;

    let projected_final_weight_kg = match goal.direction {
        GoalDirection::Surplus => current_weight_kg + projected_delta_kg,
        GoalDirection::Deficit => current_weight_kg - projected_delta_kg,
        GoalDirection::Maintenance => current_weight_kg,
    };

    Some(WeightProjection {
        days,
        projected_delta_kg,
        projected_final_weight_kg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_deficit_projection() {
        let p = project_weight_change(
            date(2024, 1, 1),
            date(2024, 1, 31),
            500.0,
            90.0,
            &EnergyGoal::deficit(500.0),
            DEFAULT_ENERGY_PER_KG,
        )
        .unwrap();

        // 30 days × 500 kcal = 15000 kcal
        assert_eq!(p.days, 30);
        assert!(approx_eq(p.projected_delta_kg, 15000.0 / 9900.0, 1e-9));
        assert!(approx_eq(p.projected_final_weight_kg, 90.0 - 15000.0 / 9900.0, 1e-9));
    }

    #[test]
    fn test_surplus_with_conventional_constant() {
        let p = project_weight_change(
            date(2024, 1, 1),
            date(2024, 1, 15),
            550.0,
            70.0,
            &EnergyGoal::surplus(550.0),
            CONVENTIONAL_ENERGY_PER_KG,
        )
        .unwrap();

        // 14 × 550 = 7700 kcal → 1 kg
        assert!(approx_eq(p.projected_delta_kg, 1.0, 1e-9));
        assert!(approx_eq(p.projected_final_weight_kg, 71.0, 1e-9));
    }

    #[test]
    fn test_negative_daily_delta_uses_magnitude() {
        let p = project_weight_change(
            date(2024, 1, 1),
            date(2024, 1, 11),
            -990.0,
            80.0,
            &EnergyGoal::deficit(990.0),
            DEFAULT_ENERGY_PER_KG,
        )
        .unwrap();
        assert!(approx_eq(p.projected_delta_kg, 1.0, 1e-9));
        assert!(approx_eq(p.projected_final_weight_kg, 79.0, 1e-9));
    }

    #[test]
    fn test_maintenance_keeps_weight() {
        let p = project_weight_change(
            date(2024, 1, 1),
            date(2024, 2, 1),
            100.0,
            65.0,
            &EnergyGoal::maintenance(),
            DEFAULT_ENERGY_PER_KG,
        )
        .unwrap();
        assert_eq!(p.projected_final_weight_kg, 65.0);
    }

    #[test]
    fn test_empty_or_reversed_range_not_projectable() {
        let goal = EnergyGoal::deficit(500.0);
        assert!(project_weight_change(
            date(2024, 1, 1),
            date(2024, 1, 1),
            500.0,
            80.0,
            &goal,
            DEFAULT_ENERGY_PER_KG
        )
        .is_none());
        assert!(project_weight_change(
            date(2024, 2, 1),
            date(2024, 1, 1),
            500.0,
            80.0,
            &goal,
            DEFAULT_ENERGY_PER_KG
        )
        .is_none());
    }
}
