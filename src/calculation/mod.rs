//! Pipeline stages of the meal benefit engine.
//!
//! This module contains the stages the engine composes, in order: identifier
//! normalization, roster extraction and enrichment, exclusion set
//! construction, role and status filtering, unit calendar and rate lookups
//! with region inference, proration of partial-period employees, value
//! aggregation, and structural validation of the output.

mod aggregate;
mod exclusion;
mod filter;
mod lookup;
mod normalize;
mod proration;
mod region;
mod roster;
mod validation;

pub use aggregate::{ProratedEmployee, aggregate, benefit_value, round_currency, split_value};
pub use exclusion::{ExclusionReason, ExclusionSet, ExclusionSources, build_exclusion_set};
pub use filter::{FilterOutcome, FilterRejection, filter_roster};
pub use lookup::{MergedEmployee, RateTable, UnitCalendar, merge_lookups};
pub use normalize::{key_set, normalize_key, normalize_key_text};
pub use proration::{ProrationContext, ProrationOutcome, prorate, scale_days};
pub use region::{RegionMatcher, canonical_region, infer_region};
pub use roster::{
    RosterExtraction, attach_admissions, attach_terminations, attach_vacations, extract_roster,
};
pub use validation::{REQUIRED_COLUMNS, ValidationReport, validate};
