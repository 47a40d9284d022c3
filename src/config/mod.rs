//! Configuration loading and management for the meal benefit engine.
//!
//! This module loads versioned rule sets from YAML files: the evaluation
//! period and cutoff, rounding and termination policies, the role/status/region
//! vocabulary, header aliases for every source, and the holiday calendar.
//!
//! # Example
//!
//! ```no_run
//! use meal_benefit_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/vr_2025_05").unwrap();
//! println!("Loaded rule set: {}", loader.rule_set().metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AdmissionColumns, ColumnMap, CostSplit, HolidayFile, KeyColumns, LeaveColumns,
    RegionVocabulary, RosterColumns, RoundingPolicy, RuleMetadata, RuleSet, RulesFile,
    TerminationColumns, TerminationHandling, UnitCalendarColumns, UnitRateColumns,
    VacationColumns, Vocabulary,
};
