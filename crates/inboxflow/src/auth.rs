//! Bearer-secret check for the scheduled fetch endpoint.
//!
//! When no secret is configured the endpoint is open, so local development
//! and platforms without cron secrets keep working.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ErrorResponse;

/// Cron authentication configuration.
#[derive(Clone, Default)]
pub struct CronAuth {
    /// Expected bearer secret. `None` disables the check.
    pub secret: Option<String>,
}

impl std::fmt::Debug for CronAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronAuth")
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl CronAuth {
    /// Whether `authorization` (the raw header value) is acceptable.
    #[must_use]
    pub fn permits(&self, authorization: Option<&str>) -> bool {
        let Some(expected) = self.secret.as_deref() else {
            return true;
        };
        authorization
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

/// Middleware that rejects requests without the configured bearer secret.
pub async fn cron_auth_middleware(
    State(auth): State<CronAuth>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if auth.permits(authorization) {
        return next.run(request).await;
    }

    tracing::warn!("cron request rejected: bad or missing bearer secret");
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_without_secret() {
        let auth = CronAuth::default();
        assert!(auth.permits(None));
        assert!(auth.permits(Some("Bearer anything")));
    }

    #[test]
    fn test_requires_exact_bearer() {
        let auth = CronAuth {
            secret: Some("s3cret".into()),
        };
        assert!(auth.permits(Some("Bearer s3cret")));
        assert!(!auth.permits(None));
        assert!(!auth.permits(Some("s3cret")));
        assert!(!auth.permits(Some("Bearer wrong")));
        assert!(!auth.permits(Some("bearer s3cret")));
    }

    #[test]
    fn test_debug_redacts() {
        let auth = CronAuth {
            secret: Some("s3cret".into()),
        };
        assert!(!format!("{auth:?}").contains("s3cret"));
    }
}
