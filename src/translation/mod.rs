//! 翻译模块
//!
//! 实时翻译的编排层，采用"纯核心 + 异步外壳"的结构：
//! - **core**: 状态机、请求序列器、源语言解析（纯逻辑）
//! - **pipeline**: 防抖与会话事件循环
//! - **providers**: 外部协作方接口及实现
//! - **language**: 语言目录
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use intersection::translation::{
//!     start_session, AzureBackend, SessionCommand, SessionConfig,
//! };
//! use intersection::rate_limit::{
//!     MemoryRateLimitStore, RateLimitConfig, SlidingWindowLimiter, SystemClock,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = Arc::new(SlidingWindowLimiter::new(
//!     Arc::new(MemoryRateLimitStore::new()),
//!     Arc::new(SystemClock),
//!     RateLimitConfig::default(),
//! ));
//! let backend = Arc::new(AzureBackend::from_env()?);
//!
//! let session = start_session(backend, limiter, "u1", SessionConfig::default());
//! session.send(SessionCommand::Input("Hallo".to_string())).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

// ============================================================================
// 子模块声明
// ============================================================================

/// 编排核心 - 状态机、请求序列器与源语言解析
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 语言目录 - 可选语言、语音区域与支持但未提供的语言
pub mod language;

/// 翻译管道模块 - 防抖与会话驱动
pub mod pipeline;

/// 外部协作方 - 检测、翻译、转写接口与实现
pub mod providers;

// ============================================================================
// 核心API导出
// ============================================================================

pub use core::{
    RecordingStatus, RequestSequencer, Slot, Ticket, TranslationEvent, TranslationSnapshot,
    TranslationState, TranslationStatus,
};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use language::{Language, SourceLanguage};
pub use pipeline::{SessionCommand, SessionConfig, SessionHandle, TranslationSession};
pub use providers::{
    AzureBackend, AzureConfig, Detection, RateLimitedBackend, TranslateOutput, TranslateRequest,
    TranslationBackend, Transcription,
};

// ============================================================================
// 便利函数
// ============================================================================

/// 为某个调用方启动一个受速率限制的翻译会话
pub fn start_session(
    backend: Arc<dyn TranslationBackend>,
    limiter: Arc<crate::rate_limit::SlidingWindowLimiter>,
    identity: &str,
    config: SessionConfig,
) -> SessionHandle {
    tracing::info!("为 {} 启动翻译会话", identity);
    let limited = Arc::new(RateLimitedBackend::new(backend, limiter, identity));
    TranslationSession::spawn(limited, config)
}
