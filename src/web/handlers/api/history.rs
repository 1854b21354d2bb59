//! 翻译历史API处理器

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, Path, State},
    http::StatusCode,
    response::Json,
};

use crate::history::{NewTranslation, TranslationRecord};
use crate::web::handlers::{error_response, ApiError, CallerIdentity};
use crate::web::types::{AppState, DeleteTranslationResponse, SaveTranslationResponse};

/// 列出调用方的翻译历史，最新的在前
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    CallerIdentity(user_id): CallerIdentity,
) -> Result<Json<Vec<TranslationRecord>>, ApiError> {
    state
        .history
        .list(&user_id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// 保存一条翻译
pub async fn save_history(
    State(state): State<Arc<AppState>>,
    CallerIdentity(user_id): CallerIdentity,
    ExtractJson(translation): ExtractJson<NewTranslation>,
) -> Result<(StatusCode, Json<SaveTranslationResponse>), ApiError> {
    let id = state
        .history
        .save(&user_id, translation)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(SaveTranslationResponse { id })))
}

/// 删除调用方的一条翻译
pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    CallerIdentity(user_id): CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<DeleteTranslationResponse>, ApiError> {
    let deleted = state
        .history
        .delete(&user_id, &id)
        .await
        .map_err(error_response)?;

    if !deleted {
        return Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": { "message": format!("Translation '{}' not found", id) }
            })),
        ));
    }

    Ok(Json(DeleteTranslationResponse { deleted }))
}
