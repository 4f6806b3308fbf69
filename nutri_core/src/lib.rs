#![forbid(unsafe_code)]

//! Nutrition calculation core.
//!
//! This crate provides:
//! - Domain types (nutrient profiles, foods, meals, plans, goals, targets)
//! - Nutrient aggregation across entries, meals and plans
//! - Energy expenditure (BMR, TDEE, calorie target)
//! - Macro target resolution
//! - Weight change projection
//! - Proportional plan rescaling
//! - File-backed collaborators (food catalog, client measurements, plan store)
//!
//! The calculation modules are pure: they never perform I/O and hold no state.

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod aggregate;
pub mod energy;
pub mod macros;
pub mod projection;
pub mod rescale;
pub mod client;
pub mod plan_store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{reference_catalog, FoodCatalog, FoodLookup};
pub use config::Config;
pub use aggregate::{aggregate_entries, aggregate_meal, aggregate_plan, scale_nutrients};
pub use energy::{basal_metabolic_rate, calorie_target, total_daily_expenditure};
pub use macros::{remainder_carb_grams, resolve_macro_grams, resolve_macro_targets};
pub use projection::project_weight_change;
pub use rescale::{apply_rescale, rescale_plan, RescaleAdjustment, RescalePolicy};
pub use client::load_client_measurements;
pub use plan_store::{load_plan, save_plan};
