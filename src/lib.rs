//! Periodic employee performance evaluations: level resolution, scoring
//! forms, score aggregation, and action-plan follow-up, served over a small
//! JSON API.

pub mod config;
pub mod error;
pub mod evaluations;
pub mod telemetry;
