//! Domain models for VERDICT.
//!
//! These are the core types shared across all crates.

pub mod assignment;
pub mod capability;
pub mod decision;
pub mod policy;
pub mod role;
