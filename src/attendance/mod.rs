//! Attendance event classification and idempotent recording.
//!
//! The pieces compose leaf to root: [`classify`] holds the pure punctuality
//! rules, [`store`] the one-row-per-employee-per-day persistence contract,
//! [`engine`] the check-in/check-out decision, and [`gateway`] the
//! device/badge resolution in front of it all.

pub mod classify;
pub mod clock;
pub mod engine;
pub mod gateway;
pub mod store;
