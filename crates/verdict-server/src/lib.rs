//! VERDICT Server — the `/v1/rbac/*` REST surface.
//!
//! Handlers are thin wrappers over [`AccessEngine`]. Authentication
//! and tenant-context extraction belong to an upstream collaborator;
//! the request bodies here carry the already-established identity.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use verdict_core::error::VerdictError;
use verdict_core::models::assignment::CreateAssignment;
use verdict_core::models::capability::Capability;
use verdict_core::models::decision::Decision;
use verdict_core::models::policy::{Context, CreatePolicy, Policy};
use verdict_core::models::role::{CreateRole, Role};
use verdict_core::repository::{AssignmentRepository, PolicyRepository, RoleRepository};
use verdict_core::Catalog;
use verdict_engine::{AccessEngine, PermissionMatrix, Principal, TenantContext};
use verdict_store::{MemoryAssignmentStore, MemoryDb, MemoryPolicyStore, MemoryRoleStore};

pub type Engine = AccessEngine<MemoryRoleStore, MemoryPolicyStore, MemoryAssignmentStore>;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

/// Builds the application over fresh in-memory stores and the seeded
/// catalog.
pub fn app() -> Router {
    let db = MemoryDb::new();
    let catalog = Arc::new(Catalog::seed());
    let engine = AccessEngine::new(
        MemoryRoleStore::new(db.clone()),
        MemoryPolicyStore::new(db.clone(), catalog.clone()),
        MemoryAssignmentStore::new(db),
        catalog,
    );
    router(AppState::new(Arc::new(engine)))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "verdict ok" }))
        .route("/v1/rbac/capabilities", get(list_capabilities))
        .route("/v1/rbac/roles", get(list_roles).post(create_role))
        .route("/v1/rbac/roles/{id}", delete(delete_role))
        .route("/v1/rbac/policies", get(list_policies).post(create_policy))
        .route(
            "/v1/rbac/assignments",
            post(create_assignment).delete(delete_assignment),
        )
        .route("/v1/rbac/authorize", post(authorize))
        .route("/v1/rbac/permission-matrix", get(permission_matrix))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

struct ApiError(VerdictError);

impl From<VerdictError> for ApiError {
    fn from(err: VerdictError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            VerdictError::NotFound { .. } => StatusCode::NOT_FOUND,
            VerdictError::DuplicateName { .. }
            | VerdictError::DuplicateCapability { .. }
            | VerdictError::RoleInUse { .. } => StatusCode::CONFLICT,
            VerdictError::CyclicInheritance { .. }
            | VerdictError::InvalidCondition { .. }
            | VerdictError::UnknownCapability { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TenantQuery {
    tenant_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct BlueprintQuery {
    blueprint: String,
}

#[derive(Debug, Deserialize)]
struct MatrixQuery {
    tenant_id: Uuid,
    blueprint: String,
}

#[derive(Debug, Deserialize)]
struct AuthorizeRequest {
    user_id: Uuid,
    tenant_id: Uuid,
    blueprint: String,
    #[serde(default)]
    superuser: bool,
    action: String,
    resource: String,
    #[serde(default)]
    context: Context,
}

async fn list_capabilities(State(state): State<AppState>) -> Json<Vec<Capability>> {
    Json(state.engine.catalog().list().to_vec())
}

async fn list_roles(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<Vec<Role>>, ApiError> {
    let roles = state.engine.roles().list(query.tenant_id).await?;
    Ok(Json(roles))
}

async fn create_role(
    State(state): State<AppState>,
    Json(input): Json<CreateRole>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let role = state.engine.roles().create(input).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, ApiError> {
    state.engine.roles().delete(query.tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_policies(
    State(state): State<AppState>,
    Query(query): Query<BlueprintQuery>,
) -> Result<Json<Vec<Policy>>, ApiError> {
    let policies = state
        .engine
        .policies()
        .list_for_blueprint(&query.blueprint)
        .await?;
    Ok(Json(policies))
}

async fn create_policy(
    State(state): State<AppState>,
    Json(input): Json<CreatePolicy>,
) -> Result<(StatusCode, Json<Policy>), ApiError> {
    let policy = state.engine.policies().create(input).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

async fn create_assignment(
    State(state): State<AppState>,
    Json(input): Json<CreateAssignment>,
) -> Result<StatusCode, ApiError> {
    state.engine.assignments().assign(input).await?;
    Ok(StatusCode::CREATED)
}

async fn delete_assignment(
    State(state): State<AppState>,
    Json(input): Json<CreateAssignment>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .assignments()
        .revoke(input.user_id, input.tenant_id, input.role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<Json<Decision>, ApiError> {
    let principal = Principal {
        user_id: request.user_id,
        superuser: request.superuser,
    };
    let tenant = TenantContext {
        tenant_id: request.tenant_id,
        blueprint: request.blueprint,
    };
    let decision = state
        .engine
        .authorize(
            &principal,
            &tenant,
            &request.action,
            &request.resource,
            &request.context,
        )
        .await?;
    Ok(Json(decision))
}

async fn permission_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> Result<Json<PermissionMatrix>, ApiError> {
    let matrix = state
        .engine
        .build_matrix(query.tenant_id, &query.blueprint)
        .await?;
    Ok(Json(matrix))
}
