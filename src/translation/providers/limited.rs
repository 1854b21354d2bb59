//! 带速率限制的翻译后端

use std::sync::Arc;

use async_trait::async_trait;

use super::{Detection, TranslateOutput, TranslateRequest, TranslationBackend, Transcription};
use crate::rate_limit::SlidingWindowLimiter;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

/// 速率限制装饰器
///
/// 只有翻译调用需要准入，检测与转写直接透传。被拒绝的翻译返回
/// [`TranslationError::RateLimitExceeded`]，不会调用内部实现。
pub struct RateLimitedBackend {
    inner: Arc<dyn TranslationBackend>,
    limiter: Arc<SlidingWindowLimiter>,
    identity: String,
}

impl RateLimitedBackend {
    pub fn new(
        inner: Arc<dyn TranslationBackend>,
        limiter: Arc<SlidingWindowLimiter>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            limiter,
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

#[async_trait]
impl TranslationBackend for RateLimitedBackend {
    async fn detect(&self, text: &str) -> TranslationResult<Detection> {
        self.inner.detect(text).await
    }

    async fn translate(&self, request: &TranslateRequest) -> TranslationResult<TranslateOutput> {
        if !self.limiter.admit(&self.identity).await.is_allowed() {
            return Err(TranslationError::RateLimitExceeded);
        }
        self.inner.translate(request).await
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        language: Language,
    ) -> TranslationResult<Transcription> {
        self.inner.transcribe(audio, language).await
    }
}
