use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use validator::Validate;

use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
    HealthResponse,
};
use edunet_authz::{AccessError, LearningGroup, Principal, SubProgram, WriteOp};

fn paginate<T>(items: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> (Vec<T>, usize, usize, usize) {
    let total = items.len();
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(50).clamp(1, 200);
    let start = (page - 1).saturating_mul(per_page);
    let paged = items.into_iter().skip(start).take(per_page).collect();
    (paged, total, page, per_page)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Prometheus metrics endpoint
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Prometheus metrics", body = String)
    ),
    tag = "health"
)]
pub async fn metrics(State(state): State<AppState>) -> Result<String> {
    let encoder = prometheus::TextEncoder::new();
    encoder
        .encode_to_string(&state.metrics.registry.gather())
        .map_err(|e| ApiError::InternalError(e.to_string()))
}

/// List subprograms visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/subprograms",
    params(SubProgramListQuery),
    responses(
        (status = 200, description = "Subprograms within the caller's scope", body = SubProgramListResponse),
        (status = 400, description = "Missing org context or malformed input", body = ErrorResponse),
        (status = 403, description = "Requested filter outside the caller's scope", body = ErrorResponse)
    ),
    tag = "subprograms"
)]
pub async fn list_sub_programs(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SubProgramListQuery>,
) -> Result<Json<SubProgramListResponse>> {
    let predicate = match state
        .engine
        .resolve_list_filter(&principal, query.to_filter())
        .await
    {
        Ok(predicate) => {
            state.metrics.record_allowed();
            predicate
        }
        Err(err) => {
            state.metrics.record_denied();
            return Err(err.into());
        }
    };

    let rows = state.sub_programs.list(&predicate).await?;
    let (items, total, page, per_page) = paginate(rows, query.page, query.per_page);

    Ok(Json(SubProgramListResponse {
        items: items.into_iter().map(SubProgramResponse::from).collect(),
        total,
        page,
        per_page,
    }))
}

/// Create a subprogram
#[utoipa::path(
    post,
    path = "/api/v1/subprograms",
    request_body = CreateSubProgramRequest,
    responses(
        (status = 200, description = "Subprogram created", body = SubProgramResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller's tier may not create subprograms", body = ErrorResponse)
    ),
    tag = "subprograms"
)]
pub async fn create_sub_program(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateSubProgramRequest>,
) -> Result<Json<SubProgramResponse>> {
    req.validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    if let Err(err) = state
        .engine
        .authorize_sub_program_write(&principal, WriteOp::Create, None)
    {
        state.metrics.record_denied();
        return Err(err.into());
    }
    state.metrics.record_allowed();

    // The owning MF is the creator's own; HQ-created subprograms are
    // platform-wide and carry no owning MF.
    let record = SubProgram {
        id: 0,
        program_id: req.program_id,
        name: req.name,
        status: req.status,
        pricing_model: req.pricing_model,
        mf_id: principal.mf_id,
        created_by: principal.user_id,
        visibility: req.visibility,
        shared_with_mfs: req.shared_with_mfs.into_iter().collect(),
        shared_with_lcs: req.shared_with_lcs.into_iter().collect(),
        created_at: chrono::Utc::now(),
    };

    let created = state.sub_programs.create(record).await?;
    Ok(Json(created.into()))
}

/// Get a single subprogram
#[utoipa::path(
    get,
    path = "/api/v1/subprograms/{id}",
    params(
        ("id" = u64, Path, description = "Subprogram ID")
    ),
    responses(
        (status = 200, description = "Subprogram details", body = SubProgramResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Subprogram not found", body = ErrorResponse)
    ),
    tag = "subprograms"
)]
pub async fn get_sub_program(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u64>,
) -> Result<Json<SubProgramResponse>> {
    let record = state
        .sub_programs
        .get(id)
        .await?
        .ok_or(AccessError::NotFound {
            entity: "Subprogram",
            id,
        })?;

    match state.engine.authorize_record_access(&principal, &record).await {
        Ok(()) => {
            state.metrics.record_allowed();
            Ok(Json(record.into()))
        }
        Err(err) => {
            state.metrics.record_denied();
            Err(err.into())
        }
    }
}

/// Update a subprogram
#[utoipa::path(
    put,
    path = "/api/v1/subprograms/{id}",
    params(
        ("id" = u64, Path, description = "Subprogram ID")
    ),
    request_body = UpdateSubProgramRequest,
    responses(
        (status = 200, description = "Subprogram updated", body = SubProgramResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller's tier may not update subprograms", body = ErrorResponse),
        (status = 404, description = "Subprogram not found", body = ErrorResponse)
    ),
    tag = "subprograms"
)]
pub async fn update_sub_program(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateSubProgramRequest>,
) -> Result<Json<SubProgramResponse>> {
    req.validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    // Tier check before the fetch so a forbidden tier gets 403, not 404
    state
        .engine
        .authorize_sub_program_write(&principal, WriteOp::Update, None)?;

    let mut record = state
        .sub_programs
        .get(id)
        .await?
        .ok_or(AccessError::NotFound {
            entity: "Subprogram",
            id,
        })?;

    if let Err(err) =
        state
            .engine
            .authorize_sub_program_write(&principal, WriteOp::Update, Some(&record))
    {
        state.metrics.record_denied();
        return Err(err.into());
    }
    state.metrics.record_allowed();

    if let Some(name) = req.name {
        record.name = name;
    }
    if let Some(status) = req.status {
        record.status = status;
    }
    if let Some(pricing_model) = req.pricing_model {
        record.pricing_model = Some(pricing_model);
    }
    if let Some(visibility) = req.visibility {
        record.visibility = visibility;
    }
    if let Some(mfs) = req.shared_with_mfs {
        record.shared_with_mfs = mfs.into_iter().collect();
    }
    if let Some(lcs) = req.shared_with_lcs {
        record.shared_with_lcs = lcs.into_iter().collect();
    }

    let updated = state.sub_programs.update(record).await?;
    Ok(Json(updated.into()))
}

/// Delete a subprogram
#[utoipa::path(
    delete,
    path = "/api/v1/subprograms/{id}",
    params(
        ("id" = u64, Path, description = "Subprogram ID")
    ),
    responses(
        (status = 200, description = "Subprogram deleted"),
        (status = 403, description = "Caller's tier may not delete subprograms", body = ErrorResponse),
        (status = 404, description = "Subprogram not found", body = ErrorResponse)
    ),
    tag = "subprograms"
)]
pub async fn delete_sub_program(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    state
        .engine
        .authorize_sub_program_write(&principal, WriteOp::Delete, None)?;

    let record = state
        .sub_programs
        .get(id)
        .await?
        .ok_or(AccessError::NotFound {
            entity: "Subprogram",
            id,
        })?;

    if let Err(err) =
        state
            .engine
            .authorize_sub_program_write(&principal, WriteOp::Delete, Some(&record))
    {
        state.metrics.record_denied();
        return Err(err.into());
    }
    state.metrics.record_allowed();

    state.sub_programs.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "id": id,
    })))
}

/// List learning groups visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/learning-groups",
    params(LearningGroupListQuery),
    responses(
        (status = 200, description = "Learning groups within the caller's scope", body = LearningGroupListResponse),
        (status = 400, description = "Missing org context or malformed input", body = ErrorResponse),
        (status = 403, description = "Requested filter outside the caller's scope", body = ErrorResponse)
    ),
    tag = "learning-groups"
)]
pub async fn list_learning_groups(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<LearningGroupListQuery>,
) -> Result<Json<LearningGroupListResponse>> {
    let predicate = match state
        .engine
        .resolve_list_filter(&principal, query.to_filter())
        .await
    {
        Ok(predicate) => {
            state.metrics.record_allowed();
            predicate
        }
        Err(err) => {
            state.metrics.record_denied();
            return Err(err.into());
        }
    };

    let rows = state.learning_groups.list(&predicate).await?;
    let (items, total, page, per_page) = paginate(rows, query.page, query.per_page);

    Ok(Json(LearningGroupListResponse {
        items: items.into_iter().map(LearningGroupResponse::from).collect(),
        total,
        page,
        per_page,
    }))
}

/// Create a learning group
///
/// The group's org scope is stamped from the creating LC's ancestry;
/// the request never carries `mf_id`/`hq_id`.
#[utoipa::path(
    post,
    path = "/api/v1/learning-groups",
    request_body = CreateLearningGroupRequest,
    responses(
        (status = 200, description = "Learning group created", body = LearningGroupResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller may not create learning groups", body = ErrorResponse)
    ),
    tag = "learning-groups"
)]
pub async fn create_learning_group(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateLearningGroupRequest>,
) -> Result<Json<LearningGroupResponse>> {
    req.validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    if let Err(err) = state.engine.authorize_learning_group_create(&principal) {
        state.metrics.record_denied();
        return Err(err.into());
    }

    let ancestry = state.engine.derive_group_ancestry(&principal).await?;
    state.metrics.record_allowed();

    let created = state
        .learning_groups
        .create(LearningGroup {
            id: 0,
            name: req.name,
            status: req.status,
            lc_id: ancestry.lc_id,
            mf_id: ancestry.mf_id,
            hq_id: ancestry.hq_id,
            created_by: principal.user_id,
            created_at: chrono::Utc::now(),
        })
        .await?;

    Ok(Json(created.into()))
}

/// Get a single learning group
#[utoipa::path(
    get,
    path = "/api/v1/learning-groups/{id}",
    params(
        ("id" = u64, Path, description = "Learning group ID")
    ),
    responses(
        (status = 200, description = "Learning group details", body = LearningGroupResponse),
        (status = 403, description = "Access denied", body = ErrorResponse),
        (status = 404, description = "Learning group not found", body = ErrorResponse)
    ),
    tag = "learning-groups"
)]
pub async fn get_learning_group(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<u64>,
) -> Result<Json<LearningGroupResponse>> {
    let record = state
        .learning_groups
        .get(id)
        .await?
        .ok_or(AccessError::NotFound {
            entity: "Learning group",
            id,
        })?;

    // Org-scope check through the same predicate a listing would use
    let predicate = state
        .engine
        .resolve_list_filter(&principal, Default::default())
        .await?;
    if !predicate.allows_learning_group(&record) {
        state.metrics.record_denied();
        return Err(AccessError::Denied.into());
    }
    state.metrics.record_allowed();

    Ok(Json(record.into()))
}
