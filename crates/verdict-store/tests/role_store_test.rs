//! Integration tests for the role store: uniqueness, inheritance-cycle
//! rejection, capability closure, and referential-integrity guards.

use std::collections::BTreeSet;
use std::sync::Arc;

use verdict_core::Catalog;
use verdict_core::error::VerdictError;
use verdict_core::models::assignment::CreateAssignment;
use verdict_core::models::policy::{CreatePolicy, PolicyKind, PolicyStatus};
use verdict_core::models::role::{CreateRole, UpdateRole};
use verdict_core::repository::{AssignmentRepository, PolicyRepository, RoleRepository};
use verdict_store::{MemoryAssignmentStore, MemoryDb, MemoryPolicyStore, MemoryRoleStore};

fn caps(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Helper: fresh shared db plus the three stores over it.
fn setup() -> (
    MemoryRoleStore,
    MemoryPolicyStore,
    MemoryAssignmentStore,
    uuid::Uuid, // tenant_id
) {
    let db = MemoryDb::new();
    let catalog = Arc::new(Catalog::seed());
    (
        MemoryRoleStore::new(db.clone()),
        MemoryPolicyStore::new(db.clone(), catalog),
        MemoryAssignmentStore::new(db),
        uuid::Uuid::new_v4(),
    )
}

fn agent_role(tenant_id: uuid::Uuid) -> CreateRole {
    CreateRole {
        tenant_id,
        name: "Agent".into(),
        capabilities: caps(&["talents.read", "talents.write"]),
        inherits_from: BTreeSet::new(),
        is_system: false,
    }
}

// ---------------------------------------------------------------------------
// Creation & uniqueness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_role() {
    let (roles, _, _, tenant_id) = setup();

    let role = roles.create(agent_role(tenant_id)).await.unwrap();
    assert_eq!(role.tenant_id, tenant_id);
    assert!(role.capabilities.contains("talents.write"));

    let fetched = roles.get_by_id(tenant_id, role.id).await.unwrap();
    assert_eq!(fetched, role);
}

#[tokio::test]
async fn duplicate_role_name_rejected() {
    let (roles, _, _, tenant_id) = setup();

    roles.create(agent_role(tenant_id)).await.unwrap();
    let result = roles.create(agent_role(tenant_id)).await;
    assert!(matches!(result, Err(VerdictError::DuplicateName { .. })));

    // The same name is fine in a different tenant.
    roles.create(agent_role(uuid::Uuid::new_v4())).await.unwrap();
}

#[tokio::test]
async fn role_not_visible_across_tenants() {
    let (roles, _, _, tenant_id) = setup();

    let role = roles.create(agent_role(tenant_id)).await.unwrap();
    let result = roles.get_by_id(uuid::Uuid::new_v4(), role.id).await;
    assert!(matches!(result, Err(VerdictError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Inheritance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn effective_capabilities_follow_inheritance() {
    let (roles, _, _, tenant_id) = setup();

    let viewer = roles
        .create(CreateRole {
            tenant_id,
            name: "Viewer".into(),
            capabilities: caps(&["talents.read", "campaigns.read"]),
            inherits_from: BTreeSet::new(),
            is_system: false,
        })
        .await
        .unwrap();

    let editor = roles
        .create(CreateRole {
            tenant_id,
            name: "Editor".into(),
            capabilities: caps(&["talents.write"]),
            inherits_from: BTreeSet::from([viewer.id]),
            is_system: false,
        })
        .await
        .unwrap();

    let manager = roles
        .create(CreateRole {
            tenant_id,
            name: "Manager".into(),
            capabilities: caps(&["campaigns.approve"]),
            inherits_from: BTreeSet::from([editor.id, viewer.id]), // diamond
            is_system: false,
        })
        .await
        .unwrap();

    let effective = roles
        .effective_capabilities(tenant_id, manager.id)
        .await
        .unwrap();
    assert_eq!(
        effective,
        caps(&[
            "campaigns.approve",
            "talents.write",
            "talents.read",
            "campaigns.read"
        ])
    );
}

#[tokio::test]
async fn inheritance_cycle_rejected_and_role_unchanged() {
    let (roles, _, _, tenant_id) = setup();

    let role_b = roles
        .create(CreateRole {
            tenant_id,
            name: "B".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::new(),
            is_system: false,
        })
        .await
        .unwrap();

    let role_a = roles
        .create(CreateRole {
            tenant_id,
            name: "A".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::from([role_b.id]),
            is_system: false,
        })
        .await
        .unwrap();

    // B inheriting from A would close the cycle A -> B -> A.
    let result = roles
        .update(
            tenant_id,
            role_b.id,
            UpdateRole {
                inherits_from: Some(BTreeSet::from([role_a.id])),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(VerdictError::CyclicInheritance { .. })
    ));

    // The rejected update left B's inheritance list unchanged.
    let fetched = roles.get_by_id(tenant_id, role_b.id).await.unwrap();
    assert!(fetched.inherits_from.is_empty());
}

#[tokio::test]
async fn longer_cycle_rejected() {
    let (roles, _, _, tenant_id) = setup();

    let c = roles
        .create(CreateRole {
            tenant_id,
            name: "C".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::new(),
            is_system: false,
        })
        .await
        .unwrap();
    let b = roles
        .create(CreateRole {
            tenant_id,
            name: "B".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::from([c.id]),
            is_system: false,
        })
        .await
        .unwrap();
    let a = roles
        .create(CreateRole {
            tenant_id,
            name: "A".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::from([b.id]),
            is_system: false,
        })
        .await
        .unwrap();

    let result = roles
        .update(
            tenant_id,
            c.id,
            UpdateRole {
                inherits_from: Some(BTreeSet::from([a.id])),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(VerdictError::CyclicInheritance { .. })
    ));
}

#[tokio::test]
async fn inheriting_unknown_role_rejected() {
    let (roles, _, _, tenant_id) = setup();

    let result = roles
        .create(CreateRole {
            tenant_id,
            name: "Orphan".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::from([uuid::Uuid::new_v4()]),
            is_system: false,
        })
        .await;
    assert!(matches!(result, Err(VerdictError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Deletion guards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_blocked_while_assigned() {
    let (roles, _, assignments, tenant_id) = setup();

    let role = roles.create(agent_role(tenant_id)).await.unwrap();
    let user_id = uuid::Uuid::new_v4();
    assignments
        .assign(CreateAssignment {
            user_id,
            tenant_id,
            role_id: role.id,
        })
        .await
        .unwrap();

    let result = roles.delete(tenant_id, role.id).await;
    assert!(matches!(result, Err(VerdictError::RoleInUse { .. })));

    // Revoking the assignment unblocks the delete.
    assignments
        .revoke(user_id, tenant_id, role.id)
        .await
        .unwrap();
    roles.delete(tenant_id, role.id).await.unwrap();
}

#[tokio::test]
async fn delete_blocked_while_referenced_by_policy() {
    let (roles, policies, _, tenant_id) = setup();

    let role = roles.create(agent_role(tenant_id)).await.unwrap();
    policies
        .create(CreatePolicy {
            name: "freeze-escrow".into(),
            blueprint: "B1".into(),
            kind: PolicyKind::Deny,
            status: PolicyStatus::Active,
            priority: 100,
            actions: caps(&["escrow.release"]),
            resources: caps(&["escrow"]),
            conditions: vec![],
            applied_to_roles: BTreeSet::from([role.id]),
        })
        .await
        .unwrap();

    let result = roles.delete(tenant_id, role.id).await;
    assert!(matches!(result, Err(VerdictError::RoleInUse { .. })));
}

#[tokio::test]
async fn delete_blocked_while_inherited() {
    let (roles, _, _, tenant_id) = setup();

    let base = roles.create(agent_role(tenant_id)).await.unwrap();
    roles
        .create(CreateRole {
            tenant_id,
            name: "Senior Agent".into(),
            capabilities: BTreeSet::new(),
            inherits_from: BTreeSet::from([base.id]),
            is_system: false,
        })
        .await
        .unwrap();

    let result = roles.delete(tenant_id, base.id).await;
    assert!(matches!(result, Err(VerdictError::RoleInUse { .. })));
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn assign_is_idempotent_and_revocation_is_immediate() {
    let (roles, _, assignments, tenant_id) = setup();

    let role = roles.create(agent_role(tenant_id)).await.unwrap();
    let user_id = uuid::Uuid::new_v4();
    let input = CreateAssignment {
        user_id,
        tenant_id,
        role_id: role.id,
    };
    assignments.assign(input).await.unwrap();
    assignments.assign(input).await.unwrap();

    let resolved = assignments.roles_for_user(tenant_id, user_id).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].name, "Agent");

    assignments
        .revoke(user_id, tenant_id, role.id)
        .await
        .unwrap();
    let resolved = assignments.roles_for_user(tenant_id, user_id).await.unwrap();
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn assigning_unknown_role_rejected() {
    let (_, _, assignments, tenant_id) = setup();

    let result = assignments
        .assign(CreateAssignment {
            user_id: uuid::Uuid::new_v4(),
            tenant_id,
            role_id: uuid::Uuid::new_v4(),
        })
        .await;
    assert!(matches!(result, Err(VerdictError::NotFound { .. })));
}
