//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Role operations require a
//! `tenant_id` parameter to enforce data isolation; policies are
//! scoped by blueprint instead of tenant. Mutations are validated
//! synchronously and never partially applied.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::VerdictResult;
use crate::models::{
    assignment::{CreateAssignment, RoleAssignment},
    policy::{CreatePolicy, Policy, UpdatePolicy},
    role::{CreateRole, Role, UpdateRole},
};

pub trait RoleRepository: Send + Sync {
    /// Creates a role. Fails with `DuplicateName` if the tenant already
    /// has a role with the same name, and with `CyclicInheritance` if
    /// the requested `inherits_from` edges would close a cycle.
    fn create(&self, input: CreateRole) -> impl Future<Output = VerdictResult<Role>> + Send;

    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VerdictResult<Role>> + Send;

    /// Applies the update atomically; on validation failure the stored
    /// role is unchanged.
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = VerdictResult<Role>> + Send;

    /// Fails with `RoleInUse` while any assignment or policy still
    /// references the role.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = VerdictResult<()>> + Send;

    fn list(&self, tenant_id: Uuid) -> impl Future<Output = VerdictResult<Vec<Role>>> + Send;

    /// Own capabilities plus the transitive closure over
    /// `inherits_from`. Computed fresh on every call; admin edits take
    /// effect immediately.
    fn effective_capabilities(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = VerdictResult<BTreeSet<String>>> + Send;
}

pub trait PolicyRepository: Send + Sync {
    /// Creates a policy. Conditions and action ids are validated here
    /// so evaluation never sees malformed data.
    fn create(&self, input: CreatePolicy) -> impl Future<Output = VerdictResult<Policy>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VerdictResult<Policy>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdatePolicy,
    ) -> impl Future<Output = VerdictResult<Policy>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = VerdictResult<()>> + Send;

    /// Active policies for the blueprint, sorted
    /// `(priority desc, id asc)` for deterministic evaluation order.
    fn list_for_blueprint(
        &self,
        blueprint: &str,
    ) -> impl Future<Output = VerdictResult<Vec<Policy>>> + Send;
}

pub trait AssignmentRepository: Send + Sync {
    /// Grants a role to a user. Idempotent; the role must exist in the
    /// tenant.
    fn assign(
        &self,
        input: CreateAssignment,
    ) -> impl Future<Output = VerdictResult<RoleAssignment>> + Send;

    /// Revokes a role from a user. Takes effect immediately for
    /// subsequent evaluations; revoking an absent assignment is a
    /// no-op.
    fn revoke(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = VerdictResult<()>> + Send;

    /// The user's roles within the tenant; empty when the user has no
    /// assignment (callers treat that as deny-all).
    fn roles_for_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = VerdictResult<Vec<Role>>> + Send;
}
