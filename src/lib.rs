//! Meal Benefit Entitlement Engine
//!
//! This crate computes the monthly meal benefit (VR/VA) each employee is
//! entitled to. It reconciles the active roster with termination, admission,
//! leave, apprentice, intern, abroad and vacation lists, looks up each
//! bargaining unit's business-day calendar and per-region daily rate, prorates
//! partial-period employees and produces a validated output table.
//!
//! The pipeline itself ([`engine::compute_benefits`]) is pure: it takes
//! in-memory [`models::Table`]s and a [`config::RuleSet`] and returns a
//! [`models::BenefitRun`]. File handling lives in [`io`].

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod summary;
