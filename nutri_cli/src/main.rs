use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nutri_core::aggregate::{energy_distribution, plan_breakdown};
use nutri_core::energy::{energy_budget, ActivityLevel, EnergyParameters};
use nutri_core::macros::{compare_to_targets, CarbohydrateMode, MacroPlanTargets, NutrientComparison};
use nutri_core::plan_store::{update_plan, version_path};
use nutri_core::rescale::{AdjustmentDirection, RescaleOutcome};
use nutri_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nutri")]
#[command(about = "Clinical nutrition calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $XDG_CONFIG_HOME/nutri/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Food catalog CSV (overrides config; built-in catalog if neither is set)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// BMR, daily expenditure, calorie target and macro targets
    Energy {
        /// harris-benedict, mifflin, katch-mcardle, cunningham, tinsley, pocket
        #[arg(long, default_value = "mifflin")]
        formula: String,

        /// Client measurement file (flags below override its values)
        #[arg(long)]
        client: Option<PathBuf>,

        #[arg(long)]
        sex: Option<String>,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        age: Option<f64>,

        #[arg(long)]
        body_fat: Option<f64>,

        /// kcal per kg for the pocket formula
        #[arg(long)]
        kcal_per_kg: Option<f64>,

        /// Activity factor (e.g. 1.55)
        #[arg(long, conflicts_with = "activity_level")]
        activity: Option<f64>,

        /// sedentary, light, moderate, very, extra
        #[arg(long)]
        activity_level: Option<String>,

        /// Extra activity kcal added to the expenditure
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        extra: f64,

        /// deficit, surplus or maintenance
        #[arg(long, default_value = "maintenance")]
        goal: String,

        /// Daily kcal adjustment for deficit/surplus
        #[arg(long, default_value_t = 0.0)]
        adjust: f64,

        /// Protein target VALUE:UNIT with UNIT g, g/kg or kcal
        #[arg(long)]
        protein: Option<String>,

        /// Fat target VALUE:UNIT
        #[arg(long)]
        fat: Option<String>,

        /// Carbohydrate target VALUE:UNIT (remainder of the calorie target if omitted)
        #[arg(long)]
        carbs: Option<String>,

        /// Compare this plan's totals against the targets
        #[arg(long)]
        plan: Option<PathBuf>,
    },

    /// Nutrient totals per meal and for the whole plan
    Totals {
        #[arg(long)]
        plan: PathBuf,
    },

    /// Scale every quantity in a plan to move its total energy
    Rescale {
        #[arg(long)]
        plan: PathBuf,

        /// Change by a percentage of the current total
        #[arg(long, conflicts_with = "absolute", required_unless_present = "absolute")]
        percent: Option<f64>,

        /// Change by an absolute number of kcal
        #[arg(long)]
        absolute: Option<f64>,

        /// Decrease instead of increase
        #[arg(long)]
        decrease: bool,

        /// Replace the plan's quantities instead of writing a new version
        #[arg(long, conflicts_with = "out")]
        overwrite: bool,

        /// Where to write the new version (defaults next to the plan)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Project body-mass change over a date range
    Project {
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        /// Daily kcal surplus or deficit
        #[arg(long, allow_hyphen_values = true)]
        daily_delta: f64,

        /// Current weight in kg
        #[arg(long)]
        weight: f64,

        /// deficit or surplus
        #[arg(long)]
        goal: String,

        /// kcal per kg (overrides config)
        #[arg(long)]
        energy_per_kg: Option<f64>,
    },

    /// List the foods in the catalog
    Foods,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        nutri_core::logging::init_with_level("debug");
    } else {
        nutri_core::logging::init();
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let catalog_path = cli.catalog.clone().or_else(|| config.catalog.path.clone());
    tracing::debug!("Using catalog {:?}", catalog_path);

    match cli.command {
        Commands::Energy {
            formula,
            client,
            sex,
            weight,
            height,
            age,
            body_fat,
            kcal_per_kg,
            activity,
            activity_level,
            extra,
            goal,
            adjust,
            protein,
            fat,
            carbs,
            plan,
        } => {
            let mut body = match client {
                Some(path) => load_client_measurements(&path)?,
                None => None,
            };
            let sex = match sex {
                Some(s) => Some(parse_sex(&s)?),
                None => body.as_ref().map(|b| b.sex),
            }
            .ok_or_else(|| Error::Other("--sex is required without a client file".into()))?;
            let body = body.get_or_insert(BodyMeasurements {
                sex,
                weight_kg: 0.0,
                height_cm: 0.0,
                age_years: 0.0,
                body_fat_percent: None,
            });
            body.sex = sex;
            body.weight_kg = weight.unwrap_or(body.weight_kg);
            body.height_cm = height.unwrap_or(body.height_cm);
            body.age_years = age.unwrap_or(body.age_years);
            body.body_fat_percent = body_fat.or(body.body_fat_percent);

            let activity_factor = match (activity, activity_level) {
                (Some(f), _) => f,
                (None, Some(level)) => parse_activity_level(&level)?.factor(),
                (None, None) => config.energy.default_activity_factor,
            };
            let params = EnergyParameters {
                formula: parse_formula(&formula)?,
                kcal_per_kg: Some(kcal_per_kg.unwrap_or(config.energy.pocket_kcal_per_kg)),
                activity_factor,
                extra_kcal: extra,
                goal: parse_goal(&goal, adjust)?,
            };
            let targets = match (protein, fat) {
                (Some(p), Some(f)) => Some(MacroPlanTargets {
                    protein: parse_macro_target(&p)?,
                    fat: parse_macro_target(&f)?,
                    carbohydrate: match carbs {
                        Some(c) => CarbohydrateMode::Explicit {
                            target: parse_macro_target(&c)?,
                        },
                        None => CarbohydrateMode::Remainder,
                    },
                }),
                (None, None) => None,
                _ => {
                    return Err(Error::Other(
                        "--protein and --fat must be given together".into(),
                    ))
                }
            };
            let plan = plan.map(|p| resolve_plan_path(&config, p));
            cmd_energy(body, &params, targets.as_ref(), plan, catalog_path.as_deref())
        }
        Commands::Totals { plan } => {
            let plan = resolve_plan_path(&config, plan);
            cmd_totals(&plan, catalog_path.as_deref())
        }
        Commands::Rescale {
            plan,
            percent,
            absolute,
            decrease,
            overwrite,
            out,
        } => {
            let direction = if decrease {
                AdjustmentDirection::Decrease
            } else {
                AdjustmentDirection::Increase
            };
            let adjustment = match (percent, absolute) {
                (Some(p), _) => RescaleAdjustment::percent(direction, p),
                (None, Some(a)) => RescaleAdjustment::absolute(direction, a),
                (None, None) => {
                    return Err(Error::Other("--percent or --absolute is required".into()))
                }
            };
            let policy = if overwrite {
                RescalePolicy::Overwrite
            } else {
                RescalePolicy::NewVersion
            };
            let plan = resolve_plan_path(&config, plan);
            cmd_rescale(&plan, &adjustment, policy, out, catalog_path.as_deref())
        }
        Commands::Project {
            from,
            to,
            daily_delta,
            weight,
            goal,
            energy_per_kg,
        } => {
            let goal = parse_goal(&goal, daily_delta.abs())?;
            let energy_per_kg = energy_per_kg.unwrap_or(config.energy.energy_per_kg);
            cmd_project(from, to, daily_delta, weight, &goal, energy_per_kg)
        }
        Commands::Foods => cmd_foods(catalog_path.as_deref()),
    }
}

/// Relative plan paths missing from the working directory fall back to
/// `<data_dir>/plans/`
fn resolve_plan_path(config: &Config, path: PathBuf) -> PathBuf {
    if path.is_relative() && !path.exists() {
        let stored = config.data.data_dir.join("plans").join(&path);
        if stored.exists() {
            tracing::debug!("Resolved plan {:?} to {:?}", path, stored);
            return stored;
        }
    }
    path
}

fn load_catalog(path: Option<&Path>) -> Result<FoodCatalog> {
    let catalog = match path {
        Some(p) => FoodCatalog::load_csv(p)?,
        None => reference_catalog().clone(),
    };
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
    }
    Ok(catalog)
}

fn cmd_energy(
    body: &BodyMeasurements,
    params: &EnergyParameters,
    targets: Option<&MacroPlanTargets>,
    plan: Option<PathBuf>,
    catalog_path: Option<&Path>,
) -> Result<()> {
    let Some(budget) = energy_budget(body, params) else {
        println!("BMR: not computable (weight, height and age are required)");
        return Ok(());
    };

    println!("Formula:  {:?}", params.formula);
    println!("BMR:      {:.0} kcal", budget.bmr);
    println!(
        "TDEE:     {:.0} kcal (activity x{})",
        budget.tdee, params.activity_factor
    );
    println!(
        "Target:   {:.0} kcal ({:?})",
        budget.target_kcal, params.goal.direction
    );

    let Some(targets) = targets else {
        return Ok(());
    };

    let grams = resolve_macro_targets(targets, body.weight_kg, budget.target_kcal);
    println!();
    println!("Protein:  {:.1} g", grams.protein_g);
    println!("Carbs:    {:.1} g", grams.carbohydrate_g);
    println!("Fat:      {:.1} g", grams.fat_g);
    if grams.is_over_allocated() {
        eprintln!("Warning: protein and fat exceed the calorie target");
    }

    if let Some(plan_path) = plan {
        let catalog = load_catalog(catalog_path)?;
        let plan = load_plan(&plan_path)?;
        let totals = aggregate_plan(&plan, &catalog)?;
        let cmp = compare_to_targets(&totals, budget.target_kcal, &grams);

        println!();
        println!("Plan '{}' vs targets:", plan.name);
        print_comparison("Energy", "kcal", &cmp.energy);
        print_comparison("Protein", "g", &cmp.protein);
        print_comparison("Carbs", "g", &cmp.carbohydrate);
        print_comparison("Fat", "g", &cmp.fat);
    }

    Ok(())
}

fn print_comparison(label: &str, unit: &str, c: &NutrientComparison) {
    let percent = c
        .percent_of_target
        .map(|p| format!("{:.0}%", p))
        .unwrap_or_else(|| "-".into());
    println!(
        "  {:<8} {:>8.1} / {:>8.1} {:<4} ({:+.1}, {})",
        label, c.actual, c.target, unit, c.difference, percent
    );
}

fn cmd_totals(plan_path: &Path, catalog_path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let plan = load_plan(plan_path)?;
    let breakdown = plan_breakdown(&plan, &catalog)?;

    println!("Plan: {}", plan.name);
    println!();
    for meal in &breakdown.meals {
        print_profile(&meal.name, &meal.totals);
    }
    println!();
    print_profile("Total", &breakdown.totals);

    if let Some(dist) = energy_distribution(&breakdown.totals) {
        println!(
            "Energy split: protein {:.0}%, carbs {:.0}%, fat {:.0}%",
            dist.protein_pct, dist.carbohydrate_pct, dist.fat_pct
        );
    }

    let missing: Vec<_> = plan
        .meals
        .iter()
        .flat_map(|m| &m.entries)
        .filter(|e| catalog.food(&e.food_id).is_none())
        .map(|e| e.food_id.as_str())
        .collect();
    if !missing.is_empty() {
        eprintln!("Unknown foods (counted as zero): {}", missing.join(", "));
    }

    Ok(())
}

fn print_profile(label: &str, p: &NutrientProfile) {
    println!(
        "  {:<16} {:>7.1} kcal  P {:>6.1} g  C {:>6.1} g  F {:>6.1} g",
        label, p.energy_kcal, p.protein_g, p.carbohydrate_g, p.fat_g
    );
}

fn cmd_rescale(
    plan_path: &Path,
    adjustment: &RescaleAdjustment,
    policy: RescalePolicy,
    out: Option<PathBuf>,
    catalog_path: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;

    match policy {
        RescalePolicy::Overwrite => {
            let plan = update_plan(plan_path, |plan| {
                apply_rescale(plan, adjustment, &catalog, RescalePolicy::Overwrite).map(|_| ())
            })?;
            let totals = aggregate_plan(&plan, &catalog)?;
            println!("✓ Plan '{}' rescaled in place", plan.name);
            println!("  New total: {:.1} kcal", totals.energy_kcal);
        }
        RescalePolicy::NewVersion => {
            let mut plan = load_plan(plan_path)?;
            if plan.locked {
                return Err(Error::PlanLocked(plan.name));
            }
            let RescaleOutcome::NewVersion(version) =
                apply_rescale(&mut plan, adjustment, &catalog, RescalePolicy::NewVersion)?
            else {
                return Err(Error::Other("rescale did not produce a new version".into()));
            };
            let out = out.unwrap_or_else(|| version_path(plan_path, &version));
            save_plan(&version, &out)?;

            let totals = aggregate_plan(&version, &catalog)?;
            println!("✓ New plan version written");
            println!("  File: {}", out.display());
            println!("  New total: {:.1} kcal", totals.energy_kcal);
        }
    }

    Ok(())
}

fn cmd_project(
    from: NaiveDate,
    to: NaiveDate,
    daily_delta: f64,
    weight: f64,
    goal: &EnergyGoal,
    energy_per_kg: f64,
) -> Result<()> {
    match project_weight_change(from, to, daily_delta, weight, goal, energy_per_kg) {
        Some(p) => {
            println!("Days:          {}", p.days);
            println!("Change:        {:.2} kg", p.projected_delta_kg);
            println!("Final weight:  {:.2} kg", p.projected_final_weight_kg);
        }
        None => println!("Not projectable: end date must be after start date"),
    }
    Ok(())
}

fn cmd_foods(catalog_path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    for food in catalog.sorted() {
        println!(
            "{:<24} {:<28} per {} {}: {:.0} kcal",
            food.id, food.name, food.reference_portion, food.unit, food.profile.energy_kcal
        );
    }
    Ok(())
}

fn parse_sex(s: &str) -> Result<Sex> {
    nutri_core::client::parse_sex(s).ok_or_else(|| Error::Other(format!("Unknown sex: {}", s)))
}

fn parse_formula(s: &str) -> Result<BmrFormula> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "harris-benedict" | "harris" => Ok(BmrFormula::HarrisBenedict),
        "mifflin" | "mifflin-st-jeor" => Ok(BmrFormula::MifflinStJeor),
        "katch-mcardle" | "katch" => Ok(BmrFormula::KatchMcArdle),
        "cunningham" => Ok(BmrFormula::Cunningham),
        "tinsley" => Ok(BmrFormula::Tinsley),
        "pocket" => Ok(BmrFormula::Pocket),
        other => Err(Error::Other(format!("Unknown formula: {}", other))),
    }
}

fn parse_activity_level(s: &str) -> Result<ActivityLevel> {
    match s.to_lowercase().as_str() {
        "sedentary" => Ok(ActivityLevel::Sedentary),
        "light" | "lightly-active" => Ok(ActivityLevel::LightlyActive),
        "moderate" | "moderately-active" => Ok(ActivityLevel::ModeratelyActive),
        "very" | "very-active" => Ok(ActivityLevel::VeryActive),
        "extra" | "extra-active" => Ok(ActivityLevel::ExtraActive),
        other => Err(Error::Other(format!("Unknown activity level: {}", other))),
    }
}

fn parse_goal(s: &str, adjustment_kcal: f64) -> Result<EnergyGoal> {
    match s.to_lowercase().as_str() {
        "deficit" | "lose" => Ok(EnergyGoal::deficit(adjustment_kcal)),
        "surplus" | "gain" => Ok(EnergyGoal::surplus(adjustment_kcal)),
        "maintenance" | "maintain" => Ok(EnergyGoal::maintenance()),
        other => Err(Error::Other(format!("Unknown goal: {}", other))),
    }
}

/// Parse `VALUE:UNIT`, e.g. `2:g/kg`, `150:g`, `600:kcal`
fn parse_macro_target(s: &str) -> Result<MacroTarget> {
    let (value, unit) = s.split_once(':').unwrap_or((s, "g"));
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| Error::Other(format!("Invalid macro value: {}", s)))?;
    match unit.trim().to_lowercase().as_str() {
        "g" => Ok(MacroTarget::grams(value)),
        "g/kg" | "gkg" => Ok(MacroTarget::grams_per_kg(value)),
        "kcal" => Ok(MacroTarget::kcal(value)),
        other => Err(Error::Other(format!("Unknown macro unit: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_macro_target() {
        assert_eq!(parse_macro_target("2:g/kg").unwrap(), MacroTarget::grams_per_kg(2.0));
        assert_eq!(parse_macro_target("150").unwrap(), MacroTarget::grams(150.0));
        assert_eq!(parse_macro_target("600:kcal").unwrap(), MacroTarget::kcal(600.0));
        assert!(parse_macro_target("x:g").is_err());
        assert!(parse_macro_target("2:lb").is_err());
    }

    #[test]
    fn test_parse_formula_aliases() {
        assert_eq!(parse_formula("Mifflin").unwrap(), BmrFormula::MifflinStJeor);
        assert_eq!(
            parse_formula("harris_benedict").unwrap(),
            BmrFormula::HarrisBenedict
        );
        assert!(parse_formula("unknown").is_err());
    }

    #[test]
    fn test_parse_goal() {
        assert_eq!(parse_goal("deficit", 500.0).unwrap(), EnergyGoal::deficit(500.0));
        assert_eq!(parse_goal("maintain", 500.0).unwrap(), EnergyGoal::maintenance());
    }
}
