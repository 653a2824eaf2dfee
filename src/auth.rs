use crate::{config::Config, error::AppError, logging::SensitiveApiKey};
use arc_swap::ArcSwap;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Authentication information attached to each authenticated request
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// Name of the API key used for authentication
    pub api_key_name: String,
}

/// Authentication middleware
/// Extracts the Bearer token and checks it against the enabled API keys
pub async fn auth_middleware(
    State(config): State<Arc<ArcSwap<Config>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = extract_bearer_token(auth_header)?;

    let config = config.load();
    let name = match find_api_key(&config, token) {
        Some(name) => name.to_string(),
        None => {
            warn!(api_key = %SensitiveApiKey::new(token), "Rejected API key");
            return Err(AppError::Unauthorized("Invalid or disabled API key".to_string()));
        }
    };

    req.extensions_mut().insert(AuthInfo { api_key_name: name });

    Ok(next.run(req).await)
}

/// Name of the enabled key matching `token`
///
/// Every configured key is compared in constant time, matched or not.
fn find_api_key<'a>(config: &'a Config, token: &str) -> Option<&'a str> {
    let mut found = None;
    for key in &config.api_keys {
        let matches: bool = key.key.as_bytes().ct_eq(token.as_bytes()).into();
        if matches && key.enabled && found.is_none() {
            found = Some(key.name.as_str());
        }
    }
    found
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
    const BEARER_PREFIX: &str = "Bearer ";

    let token = auth_header.strip_prefix(BEARER_PREFIX).ok_or_else(|| {
        AppError::Unauthorized("Authorization header must use Bearer scheme".to_string())
    })?;

    if token.is_empty() {
        return Err(AppError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    #[test]
    fn test_extract_bearer_token_success() {
        let token = extract_bearer_token("Bearer nf-test-key-001").unwrap();
        assert_eq!(token, "nf-test-key-001");
    }

    #[test]
    fn test_extract_bearer_token_missing_prefix() {
        assert!(extract_bearer_token("nf-test-key-001").is_err());
        assert!(extract_bearer_token("Basic bmY6dGVzdA==").is_err());
    }

    #[test]
    fn test_extract_bearer_token_empty() {
        assert!(extract_bearer_token("Bearer ").is_err());
    }

    #[test]
    fn test_find_api_key() {
        let config = create_test_config();
        assert_eq!(find_api_key(&config, "nf-test-key-001"), Some("custom-gpt"));
        // Disabled key
        assert_eq!(find_api_key(&config, "nf-test-key-002"), None);
        assert_eq!(find_api_key(&config, "nf-test-key-00"), None);
        assert_eq!(find_api_key(&config, ""), None);
    }

    fn app() -> Router {
        let config = Arc::new(ArcSwap::from_pointee(create_test_config()));
        Router::new()
            .route(
                "/whoami",
                get(|Extension(info): Extension<AuthInfo>| async move { info.api_key_name }),
            )
            .layer(middleware::from_fn_with_state(config, auth_middleware))
    }

    async fn status_for(auth: Option<&str>) -> StatusCode {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_middleware_accepts_enabled_key() {
        assert_eq!(status_for(Some("Bearer nf-test-key-001")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_rejects_missing_and_disabled_keys() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(Some("Bearer nf-test-key-002")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(Some("Bearer wrong")).await, StatusCode::UNAUTHORIZED);
    }
}
