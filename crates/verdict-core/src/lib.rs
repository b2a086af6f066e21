//! VERDICT Core — domain models, error taxonomy, capability catalog,
//! and repository traits for the access-control resolution engine.
//!
//! This crate has no I/O and no backend dependencies. Store
//! implementations live in `verdict-store`; the resolver, evaluator,
//! and matrix builder live in `verdict-engine`.

pub mod catalog;
pub mod error;
pub mod models;
pub mod repository;

pub use catalog::Catalog;
pub use error::{VerdictError, VerdictResult};
