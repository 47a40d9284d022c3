//! Core data models for the meal benefit engine.
//!
//! This module contains the tables exchanged with the loader and writer, the
//! employee records reconciled by the pipeline, the evaluation period, and the
//! computed benefit rows.

mod benefit;
mod employee;
mod period;
mod table;

pub use benefit::{
    BenefitComputation, BenefitRun, COL_ADMISSION_DATE, COL_COMPANY, COL_DAILY_RATE,
    COL_ELIGIBLE_DAYS, COL_EMPLOYEE_SHARE, COL_EMPLOYER_SHARE, COL_KEY, COL_PRORATED_DAYS,
    COL_REGION, COL_ROLE_TITLE, COL_TOTAL_VALUE, COL_UNIT, COL_VACATION_DAYS, CostShare,
    DaysSource, NULLABLE_COLUMNS, ProrationRule, RateSource, build_output_table,
};
pub use employee::{EmployeeKey, EmployeeRecord, TerminationNotice};
pub use period::{BusinessCalendar, EvaluationPeriod, Holiday};
pub use table::{CellValue, Table, canonical_header, fold_label};
