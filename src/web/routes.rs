//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建 API 路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // 翻译
        .route("/api/detect", post(detect_language))
        .route("/api/translate", post(translate_text))
        .route("/api/transcribe", post(transcribe_audio))
        // 速率限制
        .route("/api/rate-limit", post(check_rate_limit))
        .route("/api/purge-rate-limit", post(purge_rate_limit))
        // 翻译历史
        .route(
            "/api/translation-history",
            get(list_history).post(save_history),
        )
        .route("/api/translation-history/:id", delete(delete_history))
}
