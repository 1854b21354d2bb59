//! 外部协作方接口
//!
//! 语言检测、文本翻译与语音转写都被视为不透明的远程函数，统一由
//! [`TranslationBackend`] 描述。具体实现：
//!
//! - [`azure::AzureBackend`]: Azure Translator v3 与 Azure Speech REST 接口
//! - [`limited::RateLimitedBackend`]: 在翻译调用前做速率限制准入的装饰器

pub mod azure;
pub mod limited;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

pub use azure::{AzureBackend, AzureConfig};
pub use limited::RateLimitedBackend;

/// 语言检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub language: String,
    pub supported: bool,
    pub score: f64,
}

/// 翻译请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub to: Language,
    /// 为空时由提供方自动识别源语言
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Language>,
}

/// 单条译文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    pub text: String,
    pub to: String,
}

/// 翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslateOutput {
    pub translations: Vec<TranslationItem>,
}

impl TranslateOutput {
    pub fn single(text: impl Into<String>, to: Language) -> Self {
        Self {
            translations: vec![TranslationItem {
                text: text.into(),
                to: to.code().to_string(),
            }],
        }
    }

    /// 取第一条译文；提供方返回空列表视为翻译失败
    pub fn into_text(self) -> TranslationResult<String> {
        self.translations
            .into_iter()
            .next()
            .map(|item| item.text)
            .ok_or_else(|| TranslationError::TranslationFailure("empty translation".to_string()))
    }
}

/// 语音转写结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub display_text: String,
    pub recognition_status: String,
}

impl Transcription {
    pub fn is_success(&self) -> bool {
        self.recognition_status == "Success"
    }
}

/// 翻译服务提供方
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn detect(&self, text: &str) -> TranslationResult<Detection>;

    async fn translate(&self, request: &TranslateRequest) -> TranslationResult<TranslateOutput>;

    async fn transcribe(&self, audio: Vec<u8>, language: Language)
        -> TranslationResult<Transcription>;
}
