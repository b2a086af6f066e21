//! VERDICT Store — in-memory implementations of the `verdict-core`
//! repository traits.
//!
//! This crate provides:
//! - A shared handle over the engine's tables ([`MemoryDb`])
//! - Repository implementations with the write-time validation the
//!   core contract requires (cycle detection, duplicate names,
//!   referential-integrity guards, condition validation)
//!
//! All stores cloned from the same [`MemoryDb`] see the same data; a
//! mutation is visible to the next evaluation as soon as the call
//! returns.

mod db;
pub mod repository;

pub use db::MemoryDb;
pub use repository::{MemoryAssignmentStore, MemoryPolicyStore, MemoryRoleStore};
