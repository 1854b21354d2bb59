//! 滑动窗口速率限制
//!
//! 对身份统计最近 `window` 内的记录数，达到上限则拒绝（无副作用），
//! 否则写入一条新记录并放行。
//!
//! 计数与写入之间不加锁：同一身份的 k 个并发请求最多可以超出上限 k-1 次。
//! 存储出错时记录警告并放行。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::store::{cutoff_key, Clock, RateLimitRecord, RateLimitStore, RowKeySequence};
use crate::env::{rate_limit, EnvResult, EnvVar};
use crate::translation::error::{TranslationError, TranslationResult};

/// 准入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Admission {
    Allowed,
    Rejected,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        self == Admission::Allowed
    }
}

/// 速率限制配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// 滑动窗口长度
    pub window: Duration,
    /// 窗口内允许的最大请求数
    pub max_requests: usize,
    /// 记录保留时长，超过后由清理任务删除
    pub retention: Duration,
}

impl RateLimitConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        let config = Self {
            window: rate_limit::Window::get()?,
            max_requests: rate_limit::MaxRequests::get()?,
            retention: rate_limit::Retention::get()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// 保留期短于窗口会让清理任务删掉仍在计数的记录
    pub fn validate(&self) -> EnvResult<()> {
        if self.retention < self.window {
            return Err(crate::env::EnvError {
                variable: rate_limit::Retention::NAME.to_string(),
                message: format!(
                    "Retention ({}s) must not be shorter than the window ({}s)",
                    self.retention.as_secs(),
                    self.window.as_secs()
                ),
            });
        }
        if self.max_requests == 0 {
            return Err(crate::env::EnvError {
                variable: rate_limit::MaxRequests::NAME.to_string(),
                message: "At least one request per window must be allowed".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("速率限制配置加载失败，使用默认值: {}", e);
            Self {
                window: Duration::from_secs(300),
                max_requests: 100,
                retention: Duration::from_secs(15 * 60),
            }
        })
    }
}

/// 滑动窗口限流器
pub struct SlidingWindowLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    config: RateLimitConfig,
    sequence: RowKeySequence,
}

impl SlidingWindowLimiter {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
        config: RateLimitConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            sequence: RowKeySequence::default(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn RateLimitStore> {
        Arc::clone(&self.store)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// 对身份做一次准入判断
    pub async fn admit(&self, identity: &str) -> Admission {
        match self.try_admit(identity).await {
            Ok(admission) => admission,
            Err(e) => {
                tracing::warn!("速率限制存储不可用，放行 {}: {}", identity, e);
                metrics::counter!("rate_limit_admitted_total").increment(1);
                Admission::Allowed
            }
        }
    }

    /// 与 [`admit`](Self::admit) 相同，但把存储错误返回给调用方
    pub async fn try_admit(&self, identity: &str) -> TranslationResult<Admission> {
        if identity.is_empty() {
            return Err(TranslationError::InvalidInput(
                "identity cannot be empty".to_string(),
            ));
        }

        let now = self.clock.now();
        let window = chrono::Duration::milliseconds(self.config.window.as_millis() as i64);
        let since = cutoff_key(now - window);

        let count = self
            .store
            .count_since(identity, &since)
            .await
            .map_err(|e| e.with_context("count"))?;

        if count >= self.config.max_requests {
            tracing::debug!(
                "拒绝 {}: 窗口内已有 {} 次请求 (上限 {})",
                identity,
                count,
                self.config.max_requests
            );
            metrics::counter!("rate_limit_rejected_total").increment(1);
            return Ok(Admission::Rejected);
        }

        let record = RateLimitRecord::new(identity, self.sequence.next_key(now));
        self.store
            .insert(&record)
            .await
            .map_err(|e| e.with_context("insert"))?;

        tracing::trace!("放行 {} ({})", identity, record.row_key);
        metrics::counter!("rate_limit_admitted_total").increment(1);
        Ok(Admission::Allowed)
    }
}
