//! In-memory repository implementations.

mod assignment;
mod policy;
mod role;

pub use assignment::MemoryAssignmentStore;
pub use policy::MemoryPolicyStore;
pub use role::MemoryRoleStore;
