//! Food catalog access.
//!
//! The calculation core only ever reads foods through [`FoodLookup`]. This
//! module provides the map-backed [`FoodCatalog`], a CSV loader for food
//! tables, and a small built-in reference catalog.

use crate::{Error, Food, NutrientProfile, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Resolve a food by ID
///
/// Returning `None` is not an error: aggregation treats unknown foods as
/// contributing nothing.
pub trait FoodLookup {
    fn food(&self, id: &str) -> Option<&Food>;
}

impl FoodLookup for HashMap<String, Food> {
    fn food(&self, id: &str) -> Option<&Food> {
        self.get(id)
    }
}

impl<T: FoodLookup + ?Sized> FoodLookup for &T {
    fn food(&self, id: &str) -> Option<&Food> {
        (**self).food(id)
    }
}

/// A set of foods keyed by ID
#[derive(Clone, Debug, Default)]
pub struct FoodCatalog {
    pub foods: HashMap<String, Food>,
}

impl FoodLookup for FoodCatalog {
    fn food(&self, id: &str) -> Option<&Food> {
        self.foods.get(id)
    }
}

impl FromIterator<Food> for FoodCatalog {
    fn from_iter<I: IntoIterator<Item = Food>>(iter: I) -> Self {
        Self {
            foods: iter.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }
}

/// Column names with fixed meaning in a catalog CSV; any other column is a micronutrient
const FIXED_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "reference_portion",
    "unit",
    "energy_kcal",
    "protein_g",
    "carbohydrate_g",
    "fat_g",
];

impl FoodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, food: Food) {
        self.foods.insert(food.id.clone(), food);
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Foods sorted by ID, for stable listings
    pub fn sorted(&self) -> Vec<&Food> {
        let mut foods: Vec<_> = self.foods.values().collect();
        foods.sort_by(|a, b| a.id.cmp(&b.id));
        foods
    }

    /// Load a catalog from a CSV food table
    ///
    /// Required columns: `id,name,reference_portion,unit,energy_kcal,protein_g,
    /// carbohydrate_g,fat_g`. Every further column is read as a micronutrient
    /// named after its header; empty cells are left out.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let headers = reader.headers()?.clone();

        let column = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                Error::CatalogValidation(format!("Missing column '{}' in {:?}", name, path))
            })
        };
        let idx: Vec<usize> = FIXED_COLUMNS
            .iter()
            .map(|c| column(c))
            .collect::<Result<_>>()?;

        let extra: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !FIXED_COLUMNS.contains(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut catalog = FoodCatalog::new();
        for (row_num, record) in reader.records().enumerate() {
            let record = record?;
            let line = row_num + 2;
            let field = |i: usize| record.get(i).unwrap_or("");
            let number = |i: usize| -> Result<f64> {
                field(i).parse::<f64>().map_err(|e| {
                    Error::CatalogValidation(format!(
                        "Line {}: invalid number '{}' in column '{}': {}",
                        line,
                        field(i),
                        &headers[i],
                        e
                    ))
                })
            };

            let mut profile = NutrientProfile::new(
                number(idx[4])?,
                number(idx[5])?,
                number(idx[6])?,
                number(idx[7])?,
            );
            for (i, name) in &extra {
                if !field(*i).is_empty() {
                    profile.micronutrients.insert(name.clone(), number(*i)?);
                }
            }

            catalog.insert(Food {
                id: field(idx[0]).to_string(),
                name: field(idx[1]).to_string(),
                reference_portion: number(idx[2])?,
                unit: field(idx[3]).to_string(),
                profile,
            });
        }

        tracing::info!("Loaded {} foods from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Validate every food in the catalog
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (id, food) in &self.foods {
            if id != &food.id {
                errors.push(format!(
                    "Catalog key '{}' doesn't match food.id '{}'",
                    id, food.id
                ));
            }
            errors.extend(food.validate());
        }
        errors
    }
}

/// Cached reference catalog - built once and reused
static REFERENCE_CATALOG: Lazy<FoodCatalog> = Lazy::new(build_reference_catalog);

/// Get a reference to the built-in food catalog
pub fn reference_catalog() -> &'static FoodCatalog {
    &REFERENCE_CATALOG
}

fn food(id: &str, name: &str, portion: f64, unit: &str, profile: NutrientProfile) -> Food {
    Food {
        id: id.into(),
        name: name.into(),
        reference_portion: portion,
        unit: unit.into(),
        profile,
    }
}

/// Common foods with per-100 g (or per unit) values
fn build_reference_catalog() -> FoodCatalog {
    [
        food(
            "chicken_breast_grilled",
            "Chicken breast, grilled",
            100.0,
            "g",
            NutrientProfile::new(165.0, 31.0, 0.0, 3.6).with_micronutrient("sodium_mg", 74.0),
        ),
        food(
            "white_rice_cooked",
            "White rice, cooked",
            100.0,
            "g",
            NutrientProfile::new(130.0, 2.7, 28.2, 0.3).with_micronutrient("fiber_g", 0.4),
        ),
        food(
            "black_beans_cooked",
            "Black beans, cooked",
            100.0,
            "g",
            NutrientProfile::new(132.0, 8.9, 23.7, 0.5)
                .with_micronutrient("fiber_g", 8.7)
                .with_micronutrient("iron_mg", 2.1),
        ),
        food(
            "rolled_oats",
            "Rolled oats",
            100.0,
            "g",
            NutrientProfile::new(379.0, 13.2, 67.7, 6.5).with_micronutrient("fiber_g", 10.1),
        ),
        food(
            "whole_milk",
            "Whole milk",
            100.0,
            "ml",
            NutrientProfile::new(61.0, 3.2, 4.8, 3.3).with_micronutrient("calcium_mg", 113.0),
        ),
        food(
            "banana",
            "Banana, medium",
            1.0,
            "unit",
            NutrientProfile::new(105.0, 1.3, 27.0, 0.4)
                .with_micronutrient("fiber_g", 3.1)
                .with_micronutrient("potassium_mg", 422.0),
        ),
        food(
            "egg_whole",
            "Egg, whole",
            1.0,
            "unit",
            NutrientProfile::new(72.0, 6.3, 0.4, 4.8).with_micronutrient("sodium_mg", 71.0),
        ),
        food(
            "olive_oil",
            "Olive oil",
            100.0,
            "ml",
            NutrientProfile::new(884.0, 0.0, 0.0, 100.0),
        ),
        food(
            "broccoli_steamed",
            "Broccoli, steamed",
            100.0,
            "g",
            NutrientProfile::new(35.0, 2.4, 7.2, 0.4)
                .with_micronutrient("fiber_g", 3.3)
                .with_micronutrient("vitamin_c_mg", 64.9),
        ),
    ]
    .into_iter()
    .collect()
}
