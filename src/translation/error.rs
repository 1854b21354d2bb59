//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。检测与翻译是两个独立的失败通道，
//! 速率限制拒绝在翻译通道上单独标记。

use std::fmt;

use thiserror::Error;

use crate::env::EnvError;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// 检测到的语言不在支持列表中
    #[error("Detected language \"{0}\" is not supported")]
    DetectionUnsupported(String),

    /// 语言检测失败
    #[error("Could not detect language: {0}")]
    DetectionFailure(String),

    /// 速率限制错误
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// 翻译失败
    #[error("Translation failed: {0}")]
    TranslationFailure(String),

    /// 提供方返回的结构化错误
    #[error("Service error {code}: {message}")]
    ServiceError { code: i64, message: String },

    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 存储错误
    #[error("Store error: {0}")]
    StoreError(String),

    /// 输入验证错误
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::StoreError(_) => true,
            TranslationError::ServiceError { code, .. } => *code >= 500_000,
            TranslationError::TranslationFailure(_) => true,
            TranslationError::DetectionFailure(_) => true,
            TranslationError::RateLimitExceeded => false, // 需要等待窗口滑过
            TranslationError::DetectionUnsupported(_) => false,
            TranslationError::ConfigError(_) => false,
            TranslationError::InvalidInput(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::InternalError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::DetectionUnsupported(_) => ErrorSeverity::Info,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::RateLimitExceeded => ErrorSeverity::Warning,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::StoreError(_) => ErrorSeverity::Warning,
            TranslationError::DetectionFailure(_) => ErrorSeverity::Error,
            TranslationError::TranslationFailure(_) => ErrorSeverity::Error,
            TranslationError::ServiceError { .. } => ErrorSeverity::Error,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::DetectionUnsupported(_) | TranslationError::DetectionFailure(_) => {
                ErrorCategory::Detection
            }
            TranslationError::RateLimitExceeded => ErrorCategory::RateLimit,
            TranslationError::TranslationFailure(_) | TranslationError::ServiceError { .. } => {
                ErrorCategory::Service
            }
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::StoreError(_) => ErrorCategory::Store,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 是否属于速率限制拒绝
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, TranslationError::RateLimitExceeded)
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let wrap = |msg: String| format!("{} ({})", msg, context);

        match self {
            TranslationError::DetectionFailure(msg) => TranslationError::DetectionFailure(wrap(msg)),
            TranslationError::TranslationFailure(msg) => {
                TranslationError::TranslationFailure(wrap(msg))
            }
            TranslationError::ServiceError { code, message } => TranslationError::ServiceError {
                code,
                message: wrap(message),
            },
            TranslationError::ConfigError(msg) => TranslationError::ConfigError(wrap(msg)),
            TranslationError::NetworkError(msg) => TranslationError::NetworkError(wrap(msg)),
            TranslationError::StoreError(msg) => TranslationError::StoreError(wrap(msg)),
            TranslationError::InvalidInput(msg) => TranslationError::InvalidInput(wrap(msg)),
            TranslationError::SerializationError(msg) => {
                TranslationError::SerializationError(wrap(msg))
            }
            TranslationError::InternalError(msg) => TranslationError::InternalError(wrap(msg)),
            // 语言代码与限流错误的消息是对外契约，不附加上下文
            other @ (TranslationError::DetectionUnsupported(_)
            | TranslationError::RateLimitExceeded) => other,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Detection,
    RateLimit,
    Service,
    Configuration,
    Network,
    Store,
    Input,
    Serialization,
    Internal,
}

impl From<EnvError> for TranslationError {
    fn from(error: EnvError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::SerializationError(error.to_string())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<url::ParseError> for TranslationError {
    fn from(error: url::ParseError) -> Self {
        TranslationError::ConfigError(format!("URL: {}", error))
    }
}

#[cfg(feature = "web")]
impl From<mongodb::error::Error> for TranslationError {
    fn from(error: mongodb::error::Error) -> Self {
        TranslationError::StoreError(error.to_string())
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录并返回错误
    pub fn log_error<T>(error: TranslationError) -> TranslationResult<T> {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }

        Err(error)
    }

    /// 创建存储错误
    pub fn store_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::StoreError(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_code() {
        let err = TranslationError::DetectionUnsupported("fr".to_string());
        assert!(err.to_string().contains("\"fr\""));
        assert_eq!(err.category(), ErrorCategory::Detection);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_rate_limit_is_flagged() {
        let err = TranslationError::RateLimitExceeded;
        assert!(err.is_limit_exceeded());
        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.clone().with_context("u1"), err);
    }

    #[test]
    fn test_with_context_appends() {
        let err = TranslationError::StoreError("timeout".to_string()).with_context("count");
        assert_eq!(err, TranslationError::StoreError("timeout (count)".to_string()));
    }

    #[test]
    fn test_log_error_passes_through() {
        let result: TranslationResult<()> =
            helpers::log_error(helpers::validation_error("empty text"));
        assert_eq!(
            result,
            Err(TranslationError::InvalidInput("empty text".to_string()))
        );
    }
}
