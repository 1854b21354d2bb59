//! 速率限制API处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
};

use crate::rate_limit::PurgeReport;
use crate::translation::error::helpers;
use crate::web::handlers::{error_response, unauthorized, ApiError};
use crate::web::types::{AdmissionRequest, AdmissionResponse, AppState};

/// 对身份做一次准入判断
pub async fn check_rate_limit(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<AdmissionRequest>,
) -> Result<Json<AdmissionResponse>, ApiError> {
    let identity = request.identity.trim();
    if identity.is_empty() {
        return Err(error_response(helpers::validation_error("identity cannot be empty")));
    }

    let admission = state.limiter.admit(identity).await;
    Ok(Json(AdmissionResponse {
        allowed: admission.is_allowed(),
    }))
}

/// 比较密钥，耗时与第一个不同字节的位置无关
fn keys_match(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// 清理过期的速率限制记录，需要 `Authorization: Bearer <key>`
pub async fn purge_rate_limit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PurgeReport>, ApiError> {
    let Some(expected) = state.purge_key.as_deref() else {
        tracing::warn!("未配置清理密钥，拒绝清理请求");
        return Err(unauthorized());
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if !provided.is_some_and(|provided| keys_match(provided, expected)) {
        tracing::warn!("清理请求凭据无效");
        return Err(unauthorized());
    }

    Ok(Json(state.purge_job.run().await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("purge-secret", "purge-secret"));
        assert!(!keys_match("purge-secreT", "purge-secret"));
        assert!(!keys_match("Purge-secret", "purge-secret"));
        assert!(!keys_match("purge", "purge-secret"));
        assert!(!keys_match("", "purge-secret"));
    }
}
