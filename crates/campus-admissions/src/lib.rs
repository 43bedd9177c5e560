//! Admission lifecycle core for the campus management suite.
//!
//! Applications move through review, approved applications receive at most one
//! offer, and accepted offers backed by a completed payment become enrollments
//! with a freshly minted student identity.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
