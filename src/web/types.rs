//! Web 模块的数据类型定义

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::history::{HistoryStore, MemoryHistoryStore};
use crate::rate_limit::{
    Clock, MemoryRateLimitStore, PurgeJob, RateLimitConfig, RateLimitStore, SlidingWindowLimiter,
};
use crate::translation::language::Language;
use crate::translation::providers::TranslationBackend;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TranslationBackend>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub purge_job: Arc<PurgeJob>,
    pub history: Arc<dyn HistoryStore>,
    /// 清理接口的共享密钥；未配置时清理接口拒绝所有请求
    pub purge_key: Option<String>,
}

impl AppState {
    /// 用给定的存储组装应用状态
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        rate_limit_store: Arc<dyn RateLimitStore>,
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        config: RateLimitConfig,
        purge_key: Option<String>,
    ) -> Self {
        let purge_job = Arc::new(PurgeJob::new(
            Arc::clone(&rate_limit_store),
            Arc::clone(&clock),
            config.retention,
        ));
        let limiter = Arc::new(SlidingWindowLimiter::new(rate_limit_store, clock, config));

        Self {
            backend,
            limiter,
            purge_job,
            history,
            purge_key,
        }
    }

    /// 全部使用内存存储
    pub fn in_memory(
        backend: Arc<dyn TranslationBackend>,
        clock: Arc<dyn Clock>,
        config: RateLimitConfig,
        purge_key: Option<String>,
    ) -> Self {
        Self::new(
            backend,
            Arc::new(MemoryRateLimitStore::new()),
            Arc::new(MemoryHistoryStore::new()),
            clock,
            config,
            purge_key,
        )
    }
}

/// 语言检测请求
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

/// 语音转写查询参数
#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    pub language: Language,
}

/// 准入请求
#[derive(Debug, Deserialize)]
pub struct AdmissionRequest {
    pub identity: String,
}

/// 准入响应
#[derive(Debug, Serialize)]
pub struct AdmissionResponse {
    pub allowed: bool,
}

/// 保存翻译响应
#[derive(Debug, Serialize)]
pub struct SaveTranslationResponse {
    pub id: String,
}

/// 删除翻译响应
#[derive(Debug, Serialize)]
pub struct DeleteTranslationResponse {
    pub deleted: bool,
}
