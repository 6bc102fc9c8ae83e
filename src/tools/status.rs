//! FitPlan Status Tool
//!
//! Runtime status of the service plus the usage guide served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Shopping list instructions for AI assistants
pub const SHOPPING_LIST_INSTRUCTIONS: &str = r#"
# FitPlan Shopping List Instructions

## Overview

A shopping list is a named container of raw ingredient lines. Lines are stored
exactly as entered; when a list is read with `aggregated: true` (or exported)
the lines are standardized and merged per category.

## Workflow

1. `create_shopping_list` with a name (e.g. "Week of 2026-03-02")
2. `add_shopping_items` with every ingredient from the meal plan. Pass the
   recipe's own quantity and unit; do not convert units yourself.
3. `get_shopping_list` with `aggregated: true` to see the consolidated list
4. `set_shopping_item_checked` as items are bought
5. `clear_checked_items` when the shop is done
6. `export_shopping_list_markdown` or `export_shopping_list_pdf` to share/print

## Unit Standardization

| Input units | Output |
|---|---|
| g, gram(s), oz, ounce(s), lb, lbs, pound(s) | `g` (whole grams), or `kg` (2 decimals) from 1 kg up |
| ml, milliliter(s), l, liter(s), cup(s), tbsp, tablespoon(s), tsp, teaspoon(s) | `ml` (whole), or `litre` (2 decimals) from 1000 ml up |
| piece(s), clove(s), whole, unit(s) | `pieces` (whole number) |
| anything else ("pinch", "can", "bunch", "kg") | unchanged, quantity to 2 decimals |

Use `standardize_quantity` to preview a single conversion.

## Merging Rules

- Lines merge only inside the same category.
- Food names match case-insensitively; the first line's spelling is shown.
- Lines merge only when their *standardized* units match. 200 g of chicken and
  3 lb of chicken stay separate (g vs kg).
- A merged line keeps the checked state of the first line that formed it.

## Categories

If `category` is omitted the item is placed by name into Produce, Dairy, Meat,
Pantry, Frozen, Bakery or Other. Pass a category explicitly to override.

## Notes

- Quantities must be zero or positive when adding or updating items.
- Mutating tools are rate limited per tool; a "Rate limit exceeded" error means
  wait for the window to pass.
"#;

/// Runtime status of the FitPlan service
#[derive(Debug, Clone, Serialize)]
pub struct FitPlanStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    pub rate_limit: String,
}

/// Collects runtime information for the status tool
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    rate_limit: String,
}

impl StatusTracker {
    /// `rate_limit` is a human-readable description of the active policy
    pub fn new(database_path: PathBuf, rate_limit: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            rate_limit,
        }
    }

    pub fn get_status(&self) -> FitPlanStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FitPlanStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            rate_limit: self.rate_limit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/fitplan.db"), "off".to_string());
        let status = tracker.get_status();

        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.rate_limit, "off");
    }
}
