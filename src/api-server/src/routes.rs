//! Route definitions for the API server
//!
//! Routes are organized by functionality:
//! - Health and metrics endpoints
//! - Subprogram endpoints
//! - Learning-group endpoints
//!
//! Learning groups deliberately mount no update/delete routes; no such
//! operation exists.

use crate::{handlers, middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EduNet Franchise API",
        version = "1.0.0",
        description = "Org-scoped subprogram and learning-group API for the EduNet franchise platform",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        handlers::health_check,
        handlers::metrics,
        handlers::list_sub_programs,
        handlers::create_sub_program,
        handlers::get_sub_program,
        handlers::update_sub_program,
        handlers::delete_sub_program,
        handlers::list_learning_groups,
        handlers::create_learning_group,
        handlers::get_learning_group,
    ),
    components(
        schemas(
            crate::HealthResponse,
            crate::models::CreateSubProgramRequest,
            crate::models::UpdateSubProgramRequest,
            crate::models::SubProgramResponse,
            crate::models::SubProgramListResponse,
            crate::models::CreateLearningGroupRequest,
            crate::models::LearningGroupResponse,
            crate::models::LearningGroupListResponse,
            crate::models::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health and monitoring endpoints"),
        (name = "subprograms", description = "Shareable subprogram endpoints"),
        (name = "learning-groups", description = "Org-scoped learning group endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Subprogram endpoints
        .route("/subprograms", get(handlers::list_sub_programs))
        .route("/subprograms", post(handlers::create_sub_program))
        .route("/subprograms/:id", get(handlers::get_sub_program))
        .route("/subprograms/:id", axum::routing::put(handlers::update_sub_program))
        .route("/subprograms/:id", axum::routing::delete(handlers::delete_sub_program))
        // Learning-group endpoints
        .route("/learning-groups", get(handlers::list_learning_groups))
        .route("/learning-groups", post(handlers::create_learning_group))
        .route("/learning-groups/:id", get(handlers::get_learning_group));

    Router::new()
        // Health and metrics (no claims required)
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // API routes (claims required)
        .nest("/api/v1", api_routes)
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add state
        .with_state(state)
        // Add middleware layers (executed bottom to top)
        .layer(axum_middleware::from_fn(middleware::principal_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::cors_layer())
        .layer(TraceLayer::new_for_http())
}
