//! # Intersection
//!
//! 实时文本与语音翻译服务：用户输入经防抖、源语言解析和按代号排序的请求派发
//! 后进入状态机；翻译调用由按身份的滑动窗口限流器把关。
//!
//! ## 模块组织
//!
//! - `translation` - 状态机、请求序列器、防抖会话与翻译提供方
//! - `rate_limit` - 滑动窗口限流、记录存储与过期清理
//! - `env` - 类型安全的环境变量
//! - `history` - 翻译历史（web 功能）
//! - `web` - HTTP 接口（web 功能）

pub mod env;
#[cfg(feature = "web")]
pub mod history;
pub mod rate_limit;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use rate_limit::{Admission, SlidingWindowLimiter};
pub use translation::{
    Language, SessionCommand, SourceLanguage, TranslationError, TranslationResult,
    TranslationState,
};
