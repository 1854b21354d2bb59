//! 检测、翻译与转写API处理器

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Json as ExtractJson, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::translation::error::helpers;
use crate::translation::providers::{
    Detection, RateLimitedBackend, TranslateOutput, TranslateRequest, TranslationBackend,
    Transcription,
};
use crate::web::handlers::{error_response, ApiError, CallerIdentity};
use crate::web::types::{AppState, DetectRequest, TranscribeQuery};

/// 语言检测（不受速率限制）
pub async fn detect_language(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<DetectRequest>,
) -> Result<Json<Detection>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(error_response(helpers::validation_error("text cannot be empty")));
    }

    state
        .backend
        .detect(&request.text)
        .await
        .map(Json)
        .map_err(error_response)
}

/// 翻译文本，调用前先做速率限制准入
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    CallerIdentity(identity): CallerIdentity,
    ExtractJson(request): ExtractJson<TranslateRequest>,
) -> Result<Json<TranslateOutput>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(error_response(helpers::validation_error("text cannot be empty")));
    }

    let backend = RateLimitedBackend::new(
        Arc::clone(&state.backend),
        Arc::clone(&state.limiter),
        identity,
    );

    backend
        .translate(&request)
        .await
        .map(Json)
        .map_err(error_response)
}

/// 语音转写，请求体为 WAV 音频
pub async fn transcribe_audio(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscribeQuery>,
    body: Bytes,
) -> Result<Json<Transcription>, ApiError> {
    if body.is_empty() {
        return Err(error_response(helpers::validation_error("audio body cannot be empty")));
    }

    let transcription = state
        .backend
        .transcribe(body.to_vec(), query.language)
        .await
        .map_err(error_response)?;

    if !transcription.is_success() {
        tracing::warn!("语音未识别: {}", transcription.recognition_status);
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": {
                    "message": format!("Speech not recognized: {}", transcription.recognition_status)
                }
            })),
        ));
    }

    Ok(Json(transcription))
}
