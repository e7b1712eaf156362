use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use edunet_authz::AccessError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Access(#[from] AccessError),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// HTTP status for the error, per the authorization taxonomy:
    /// 400 configuration/validation, 401 missing identity, 403 denial,
    /// 404 not-found-after-authorization, 500 infrastructure.
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Access(e) => match e {
                AccessError::MissingOrgContext(_) | AccessError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                AccessError::InvalidRole { .. }
                | AccessError::OrgFilterDenied(_)
                | AccessError::Denied
                | AccessError::TierForbidden { .. } => StatusCode::FORBIDDEN,
                AccessError::NotFound { .. } => StatusCode::NOT_FOUND,
                AccessError::Directory(_) | AccessError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
