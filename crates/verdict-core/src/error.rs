//! Error types for the VERDICT engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unknown capability: action {action} on resource {resource}")]
    UnknownCapability { action: String, resource: String },

    #[error("Cyclic role inheritance: {role_name}")]
    CyclicInheritance { role_name: String },

    #[error("Duplicate role name for tenant: {name}")]
    DuplicateName { name: String },

    #[error("Duplicate capability id in catalog: {id}")]
    DuplicateCapability { id: String },

    #[error("Role is still referenced by assignments or policies: {id}")]
    RoleInUse { id: String },

    #[error("Invalid policy condition on field {field}: {reason}")]
    InvalidCondition { field: String, reason: String },
}

pub type VerdictResult<T> = Result<T, VerdictError>;
