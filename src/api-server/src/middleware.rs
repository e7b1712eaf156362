//! Middleware layer for the API server
//!
//! This module provides middleware components for:
//! - Principal extraction from gateway-supplied claims headers
//! - Request logging and tracing
//! - CORS configuration
//! - Request ID tracking

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use edunet_authz::Principal;

/// Request ID header name
pub const X_REQUEST_ID: &str = "x-request-id";

/// Claims headers injected by the upstream authentication gateway.
/// This layer trusts them as already verified.
pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_ROLE: &str = "x-user-role";
pub const X_HQ_ID: &str = "x-hq-id";
pub const X_MF_ID: &str = "x-mf-id";
pub const X_LC_ID: &str = "x-lc-id";

/// Configure CORS middleware
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(X_REQUEST_ID),
            HeaderName::from_static(X_USER_ID),
            HeaderName::from_static(X_USER_ROLE),
            HeaderName::from_static(X_HQ_ID),
            HeaderName::from_static(X_MF_ID),
            HeaderName::from_static(X_LC_ID),
        ])
        .expose_headers([HeaderName::from_static(X_REQUEST_ID)])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Request ID middleware
///
/// Generates or extracts a unique request ID for tracking requests
/// through the system.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    response.headers_mut().insert(
        X_REQUEST_ID,
        HeaderValue::from_str(&request_id.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("invalid-uuid")),
    );

    response
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<Uuid>()
        .copied()
        .unwrap_or_else(Uuid::new_v4);

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status();
    macro_rules! log_completed {
        ($level:expr) => {
            tracing::event!(
                $level,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                status = %status.as_u16(),
                duration_ms = elapsed.as_millis() as u64,
                "Request completed"
            )
        };
    }
    match status.as_u16() {
        500..=599 => log_completed!(tracing::Level::ERROR),
        400..=499 => log_completed!(tracing::Level::WARN),
        _ => log_completed!(tracing::Level::INFO),
    };

    response
}

/// Principal extraction middleware
///
/// Converts the gateway claims headers into a typed [`Principal`] and
/// stores it in request extensions. The tier is derived here, once;
/// handlers never parse role strings.
pub async fn principal_middleware(mut request: Request, next: Next) -> Response {
    // Claims are not required for health, metrics, or docs
    let path = request.uri().path();
    if path == "/health" || path == "/metrics" || path.starts_with("/api-docs") {
        return next.run(request).await;
    }

    let request_id = request
        .extensions()
        .get::<Uuid>()
        .copied()
        .unwrap_or_else(Uuid::new_v4);

    let principal = match principal_from_headers(request.headers()) {
        Ok(principal) => principal,
        Err(err) => {
            warn!(
                request_id = %request_id,
                path = %path,
                error = %err,
                "rejected request at the principal boundary"
            );
            return err.into_response();
        }
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, ApiError> {
    let user_id = required_numeric(headers, X_USER_ID)?;
    let role = headers
        .get(X_USER_ROLE)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::Unauthorized)?;
    let hq_id = required_numeric(headers, X_HQ_ID)?;
    let mf_id = optional_numeric(headers, X_MF_ID)?;
    let lc_id = optional_numeric(headers, X_LC_ID)?;

    Ok(Principal::from_claims(user_id, role, hq_id, mf_id, lc_id)?)
}

fn required_numeric(headers: &HeaderMap, name: &str) -> Result<u64, ApiError> {
    let raw = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::Unauthorized)?;
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be numeric", name)))
}

fn optional_numeric(headers: &HeaderMap, name: &str) -> Result<Option<u64>, ApiError> {
    match headers.get(name).and_then(|v| v.to_str().ok()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} must be numeric", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunet_authz::Tier;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_principal_from_valid_headers() {
        let map = headers(&[
            (X_USER_ID, "42"),
            (X_USER_ROLE, "LC_ADMIN"),
            (X_HQ_ID, "1"),
            (X_MF_ID, "5"),
            (X_LC_ID, "9"),
        ]);
        let principal = principal_from_headers(&map).unwrap();
        assert_eq!(principal.tier, Tier::Lc);
        assert_eq!(principal.lc_id, Some(9));
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let map = headers(&[(X_USER_ROLE, "HQ_ADMIN"), (X_HQ_ID, "1")]);
        assert!(matches!(
            principal_from_headers(&map).unwrap_err(),
            ApiError::Unauthorized
        ));
    }

    #[test]
    fn test_non_numeric_id_is_bad_request() {
        let map = headers(&[
            (X_USER_ID, "abc"),
            (X_USER_ROLE, "HQ_ADMIN"),
            (X_HQ_ID, "1"),
        ]);
        assert!(matches!(
            principal_from_headers(&map).unwrap_err(),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_unknown_role_is_access_error() {
        let map = headers(&[
            (X_USER_ID, "42"),
            (X_USER_ROLE, "ROOT"),
            (X_HQ_ID, "1"),
        ]);
        assert!(matches!(
            principal_from_headers(&map).unwrap_err(),
            ApiError::Access(_)
        ));
    }
}
