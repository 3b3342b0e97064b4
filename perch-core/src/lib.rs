//! Perch Core
//!
//! Core types and time arithmetic for the perch keep-alive controller.
//!
//! This crate contains:
//! - Domain types: queue records, reservations, submission requests
//! - Clock abstraction: a swappable "now" so tests can pin time
//! - SLURM time handling: duration parsing, walltime formatting

pub mod clock;
pub mod domain;
pub mod timefmt;
