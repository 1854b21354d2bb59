//! Web 路由处理器
//!
//! 所有处理器返回 `Result<Json<T>, (StatusCode, Json<serde_json::Value>)>`，
//! 错误体统一为 `{"error": {...}}`。

pub mod api;

pub use api::*;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Json,
};
use serde_json::{json, Value};

use crate::translation::error::TranslationError;

/// 调用方身份请求头，由上游认证网关写入
pub const IDENTITY_HEADER: &str = "x-user-id";

/// 处理器错误类型
pub type ApiError = (StatusCode, Json<Value>);

/// 已认证的调用方身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CallerIdentity(value.to_string()))
            .ok_or_else(unauthorized)
    }
}

/// 401 `{"error": "Unauthorized"}`
pub fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
}

/// 把翻译错误映射为 HTTP 响应
pub fn error_response(error: TranslationError) -> ApiError {
    let (status, body) = match &error {
        TranslationError::RateLimitExceeded => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "message": error.to_string(), "limitExceeded": true }),
        ),
        TranslationError::ServiceError { code, message } => (
            StatusCode::BAD_GATEWAY,
            json!({ "code": code, "message": message }),
        ),
        TranslationError::InvalidInput(_) | TranslationError::DetectionUnsupported(_) => {
            (StatusCode::BAD_REQUEST, json!({ "message": error.to_string() }))
        }
        TranslationError::NetworkError(_)
        | TranslationError::TranslationFailure(_)
        | TranslationError::DetectionFailure(_) => {
            (StatusCode::BAD_GATEWAY, json!({ "message": error.to_string() }))
        }
        TranslationError::StoreError(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "message": error.to_string() }),
        ),
        TranslationError::ConfigError(_)
        | TranslationError::SerializationError(_)
        | TranslationError::InternalError(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": error.to_string() }),
        ),
    };

    if status.is_server_error() {
        tracing::error!("请求失败: {}", error);
    } else {
        tracing::debug!("请求被拒绝: {}", error);
    }

    (status, Json(json!({ "error": body })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_maps_to_429_with_flag() {
        let (status, Json(body)) = error_response(TranslationError::RateLimitExceeded);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["message"], "Rate limit exceeded");
        assert_eq!(body["error"]["limitExceeded"], true);
    }

    #[test]
    fn test_service_error_keeps_provider_code() {
        let (status, Json(body)) = error_response(TranslationError::ServiceError {
            code: 400036,
            message: "The target language is not valid.".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], 400036);
    }
}
