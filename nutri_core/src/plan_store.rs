//! Meal plan persistence with file locking.
//!
//! Plans are stored one per JSON file. Reads take a shared lock; writes go
//! to a locked temp file in the same directory which is then renamed over
//! the target.

use crate::{Error, MealPlan, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Load a plan from a JSON file with shared locking
///
/// Unlike client measurements, a missing or corrupt plan is an error: there
/// is no sensible default plan to fall back to.
pub fn load_plan(path: &Path) -> Result<MealPlan> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    let plan: MealPlan = serde_json::from_str(&contents)?;
    tracing::debug!(
        "Loaded plan '{}' ({} meals) from {:?}",
        plan.name,
        plan.meals.len(),
        path
    );
    Ok(plan)
}

/// Save a plan to a JSON file atomically
///
/// 1. Write to a temp file in the target directory
/// 2. Sync to disk
/// 3. Rename over the original
pub fn save_plan(plan: &MealPlan, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let temp = NamedTempFile::new_in(&parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(plan)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Saved plan '{}' to {:?}", plan.name, path);
    Ok(())
}

/// Default file name for a derived plan version: `<stem>.<id>.json`
pub fn version_path(original: &Path, plan: &MealPlan) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plan".to_string());
    original.with_file_name(format!("{}.{}.json", stem, plan.id))
}

/// Load a plan, modify it, and save it back
///
/// Refuses locked plans before calling `f`.
pub fn update_plan<F>(path: &Path, f: F) -> Result<MealPlan>
where
    F: FnOnce(&mut MealPlan) -> Result<()>,
{
    let mut plan = load_plan(path)?;
    if plan.locked {
        return Err(Error::PlanLocked(plan.name));
    }
    f(&mut plan)?;
    save_plan(&plan, path)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FoodEntry, MealSlot};
    use chrono::NaiveDate;

    fn sample_plan() -> MealPlan {
        let mut plan = MealPlan::with_canonical_meals(
            "client-3",
            "Spring plan",
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        );
        if let Some(meal) = plan.meal_for_slot_mut(MealSlot::Lunch) {
            meal.entries
                .push(FoodEntry::new("chicken_breast_grilled", 150.0, "g"));
        }
        plan
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");

        let plan = sample_plan();
        save_plan(&plan, &path).unwrap();
        let loaded = load_plan(&path).unwrap();

        assert_eq!(loaded, plan);
    }

    #[test]
    fn test_load_missing_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_plan(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_corrupt_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(load_plan(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");

        save_plan(&sample_plan(), &path).unwrap();

        // Verify plan file exists and no stray temp files remain
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "plan.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only plan.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_update_refuses_locked_plan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");

        let mut plan = sample_plan();
        plan.locked = true;
        save_plan(&plan, &path).unwrap();

        let result = update_plan(&path, |p| {
            p.name = "changed".into();
            Ok(())
        });
        assert!(matches!(result, Err(Error::PlanLocked(_))));
        assert_eq!(load_plan(&path).unwrap().name, "Spring plan");
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.json");
        save_plan(&sample_plan(), &path).unwrap();

        update_plan(&path, |p| {
            p.end_date = NaiveDate::from_ymd_opt(2024, 6, 30);
            Ok(())
        })
        .unwrap();

        let loaded = load_plan(&path).unwrap();
        assert_eq!(loaded.end_date, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn test_version_path() {
        let plan = sample_plan();
        let path = version_path(Path::new("/plans/spring.json"), &plan);
        assert_eq!(
            path,
            PathBuf::from(format!("/plans/spring.{}.json", plan.id))
        );
    }
}
