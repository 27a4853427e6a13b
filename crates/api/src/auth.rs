//! API key 认证
//!
//! 单一共享密钥，通过 `X-API-Key` 请求头或 `api-key` 查询参数提交，
//! 请求头优先。`/` 与不带过滤参数的 `GET /api/tasks` 为公开路由。

use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use taskboard_config::AuthConfig;
use tracing::warn;

use crate::error::ApiError;
use crate::handlers::tasks::filter_from_query;
use crate::response::no_content;
use crate::routes::{AppState, ROOT_PATH, TASKS_PATH};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY_QUERY_PARAM: &str = "api-key";
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";
pub const ALLOWED_HEADERS: &str = "Content-Type, X-API-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("invalid API key")]
    InvalidApiKey,
}

/// 只保存配置密钥的 SHA-256 摘要，不保存明文
#[derive(Debug, Clone)]
pub struct ApiKeyGate {
    enabled: bool,
    key_digest: Vec<u8>,
}

impl ApiKeyGate {
    pub fn new(api_key: &str) -> Self {
        Self {
            enabled: true,
            key_digest: hash_api_key(api_key),
        }
    }

    /// 放行所有请求的网关
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            key_digest: Vec::new(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        if config.enabled {
            Self::new(&config.api_key)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn verify(&self, presented: Option<&str>) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }

        let api_key = presented.ok_or(AuthError::MissingApiKey)?;
        if hash_api_key(api_key) == self.key_digest {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}

fn hash_api_key(api_key: &str) -> Vec<u8> {
    Sha256::digest(api_key.as_bytes()).to_vec()
}

/// 请求头优先于查询参数，空值视为未提供
pub fn extract_api_key(headers: &HeaderMap, query: &HashMap<String, String>) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            query
                .get(API_KEY_QUERY_PARAM)
                .filter(|s| !s.is_empty())
                .cloned()
        })
}

pub fn is_public_route(method: &Method, path: &str, query: &HashMap<String, String>) -> bool {
    match path {
        ROOT_PATH => true,
        TASKS_PATH => *method == Method::GET && filter_from_query(query).is_empty(),
        _ => false,
    }
}

/// 所有 `OPTIONS` 请求在认证之前直接返回空的 204
pub async fn preflight_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return preflight_response();
    }
    next.run(request).await
}

pub fn preflight_response() -> Response {
    let mut response = no_content("Pre-flight request answered");
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();

    if is_public_route(request.method(), request.uri().path(), &query) {
        return Ok(next.run(request).await);
    }

    let api_key = extract_api_key(request.headers(), &query);
    if let Err(err) = state.api_key_gate.verify(api_key.as_deref()) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Authentication failed: {}",
            err
        );
        return Err(err.into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_gate_accepts_only_the_configured_key() {
        let gate = ApiKeyGate::new("secret");
        assert!(gate.is_enabled());
        assert_eq!(gate.verify(Some("secret")), Ok(()));
        assert_eq!(gate.verify(Some("Secret")), Err(AuthError::InvalidApiKey));
        assert_eq!(gate.verify(None), Err(AuthError::MissingApiKey));
    }

    #[test]
    fn test_disabled_gate() {
        let gate = ApiKeyGate::from_config(&AuthConfig {
            enabled: false,
            api_key: String::new(),
        });
        assert!(!gate.is_enabled());
        assert_eq!(gate.verify(None), Ok(()));
    }

    #[test]
    fn test_header_takes_precedence_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("from-header"));
        let q = query(&[(API_KEY_QUERY_PARAM, "from-query")]);
        assert_eq!(
            extract_api_key(&headers, &q).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn test_query_used_when_header_missing_or_empty() {
        let q = query(&[(API_KEY_QUERY_PARAM, "from-query")]);
        assert_eq!(
            extract_api_key(&HeaderMap::new(), &q).as_deref(),
            Some("from-query")
        );

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(""));
        assert_eq!(extract_api_key(&headers, &q).as_deref(), Some("from-query"));

        assert_eq!(extract_api_key(&HeaderMap::new(), &HashMap::new()), None);
    }

    #[test]
    fn test_public_routes() {
        let none = HashMap::new();
        assert!(is_public_route(&Method::GET, "/", &none));
        assert!(is_public_route(&Method::GET, "/api/tasks", &none));
        assert!(is_public_route(
            &Method::GET,
            "/api/tasks",
            &query(&[(API_KEY_QUERY_PARAM, "x"), ("completed", "")])
        ));

        assert!(!is_public_route(&Method::POST, "/api/tasks", &none));
        assert!(!is_public_route(&Method::GET, "/api/tasks/stats", &none));
        assert!(!is_public_route(&Method::GET, "/api/tasks/1", &none));
        assert!(!is_public_route(
            &Method::GET,
            "/api/tasks",
            &query(&[("q", "milk")])
        ));
        assert!(!is_public_route(
            &Method::GET,
            "/api/tasks",
            &query(&[("priority", "high")])
        ));
    }

    #[test]
    fn test_preflight_response_headers() {
        let response = preflight_response();
        assert_eq!(response.status(), axum::http::StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
            ALLOWED_HEADERS
        );
    }
}
