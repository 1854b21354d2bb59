//! Azure 提供方
//!
//! - 语言检测与翻译: Azure Translator v3 (`/detect`, `/translate`)
//! - 语音转写: Azure Speech 短音频 REST 接口
//!
//! 两个服务在出错时都可能返回 `{"error": {"code", "message"}}`，统一转为
//! [`TranslationError::ServiceError`]。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Detection, TranslateOutput, TranslateRequest, TranslationBackend, Transcription};
use crate::env::{translator, EnvResult, EnvVar};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::Language;

const API_VERSION: &str = "3.0";
const SUBSCRIPTION_KEY: &str = "Ocp-Apim-Subscription-Key";
const SUBSCRIPTION_REGION: &str = "Ocp-Apim-Subscription-Region";

/// Azure 连接配置
#[derive(Debug, Clone)]
pub struct AzureConfig {
    /// Translator 端点，以 `/` 结尾
    pub endpoint: String,
    pub key: String,
    pub region: String,
    /// 为空时使用 Translator 密钥
    pub speech_key: Option<String>,
    pub speech_region: String,
    pub timeout: Duration,
}

impl AzureConfig {
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            endpoint: translator::Endpoint::get()?,
            key: translator::Key::get()?,
            region: translator::Region::get()?,
            speech_key: translator::SpeechKey::get().ok(),
            speech_region: translator::SpeechRegion::get()?,
            timeout: translator::RequestTimeout::get()?,
        })
    }

    fn speech_key(&self) -> &str {
        self.speech_key.as_deref().unwrap_or(&self.key)
    }

    fn translator_url(&self, path: &str) -> TranslationResult<Url> {
        let base = if self.endpoint.ends_with('/') {
            Url::parse(&self.endpoint)?
        } else {
            Url::parse(&format!("{}/", self.endpoint))?
        };
        let mut url = base.join(path)?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn speech_url(&self, language: Language) -> TranslationResult<Url> {
        let mut url = Url::parse(&format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
            self.speech_region
        ))?;
        url.query_pairs_mut()
            .append_pair("language", language.speech_locale());
        Ok(url)
    }
}

#[derive(Serialize)]
struct TextItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectItem {
    language: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    is_translation_supported: bool,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpeechResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: String,
}

/// 把响应体解析为 `T`，或识别其中的结构化错误
fn parse_body<T: for<'de> Deserialize<'de>>(
    status: reqwest::StatusCode,
    body: &str,
) -> TranslationResult<T> {
    let value: Option<serde_json::Value> = serde_json::from_str(body).ok();

    // 只有顶层为对象且带 `error` 键时才是结构化错误；成功响应是数组
    if let Some(error) = value.as_ref().and_then(|v| v.as_object()?.get("error")) {
        let detail = serde_json::from_value::<ErrorDetail>(error.clone()).unwrap_or_else(|_| {
            ErrorDetail {
                code: i64::from(status.as_u16()),
                message: error.to_string(),
            }
        });
        return Err(TranslationError::ServiceError {
            code: detail.code,
            message: detail.message,
        });
    }

    if !status.is_success() {
        return Err(TranslationError::ServiceError {
            code: i64::from(status.as_u16()),
            message: body.chars().take(200).collect(),
        });
    }

    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(serde_json::from_str(body)?),
    }
}

/// Azure 翻译服务客户端
#[derive(Debug, Clone)]
pub struct AzureBackend {
    client: reqwest::Client,
    config: AzureConfig,
}

impl AzureBackend {
    pub fn new(config: AzureConfig) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> TranslationResult<Self> {
        Self::new(AzureConfig::from_env()?)
    }

    async fn post_text<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
        text: &str,
    ) -> TranslationResult<T> {
        tracing::debug!("Azure 请求: {}", url.path());
        let response = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY, &self.config.key)
            .header(SUBSCRIPTION_REGION, &self.config.region)
            .json(&[TextItem { text }])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_body(status, &body)
    }
}

#[async_trait]
impl TranslationBackend for AzureBackend {
    async fn detect(&self, text: &str) -> TranslationResult<Detection> {
        let url = self.config.translator_url("detect")?;
        let items: Vec<DetectItem> = self.post_text(url, text).await?;
        let item = items.into_iter().next().ok_or_else(|| {
            TranslationError::DetectionFailure("empty detection response".to_string())
        })?;

        Ok(Detection {
            language: item.language,
            supported: item.is_translation_supported,
            score: item.score,
        })
    }

    async fn translate(&self, request: &TranslateRequest) -> TranslationResult<TranslateOutput> {
        let mut url = self.config.translator_url("translate")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(from) = request.from {
                query.append_pair("from", from.code());
            }
            query.append_pair("to", request.to.code());
        }

        let mut items: Vec<TranslateOutput> = self.post_text(url, &request.text).await?;
        if items.is_empty() {
            return Err(TranslationError::TranslationFailure(
                "empty translation response".to_string(),
            ));
        }
        Ok(items.swap_remove(0))
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        language: Language,
    ) -> TranslationResult<Transcription> {
        if audio.is_empty() {
            return Err(TranslationError::InvalidInput("empty audio".to_string()));
        }

        let url = self.config.speech_url(language)?;
        tracing::debug!("Azure 语音转写: {} 字节, {}", audio.len(), language.speech_locale());
        let response = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY, self.config.speech_key())
            .header(CONTENT_TYPE, "audio/wav")
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let speech: SpeechResponse = parse_body(status, &body)?;

        Ok(Transcription {
            display_text: speech.display_text,
            recognition_status: speech.recognition_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn config(endpoint: &str) -> AzureConfig {
        AzureConfig {
            endpoint: endpoint.to_string(),
            key: "key".to_string(),
            region: "westeurope".to_string(),
            speech_key: None,
            speech_region: "westeurope".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_translator_url_with_and_without_slash() {
        for endpoint in [
            "https://api.cognitive.microsofttranslator.com/",
            "https://api.cognitive.microsofttranslator.com",
        ] {
            let url = config(endpoint).translator_url("detect").unwrap();
            assert_eq!(
                url.as_str(),
                "https://api.cognitive.microsofttranslator.com/detect?api-version=3.0"
            );
        }
    }

    #[test]
    fn test_speech_url_uses_locale() {
        let url = config("https://x/").speech_url(Language::Dutch).unwrap();
        assert!(url.as_str().starts_with("https://westeurope.stt.speech.microsoft.com/"));
        assert!(url.as_str().ends_with("language=nl-NL"));
    }

    #[test]
    fn test_parse_detection_body() {
        let body = r#"[{"language":"nl","score":0.98,"isTranslationSupported":true,"isTransliterationSupported":false}]"#;
        let items: Vec<DetectItem> = parse_body(StatusCode::OK, body).unwrap();
        assert_eq!(items[0].language, "nl");
        assert!(items[0].is_translation_supported);
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error":{"code":401000,"message":"credentials are missing"}}"#;
        let result: TranslationResult<Vec<DetectItem>> = parse_body(StatusCode::UNAUTHORIZED, body);
        assert_eq!(
            result.err(),
            Some(TranslationError::ServiceError {
                code: 401000,
                message: "credentials are missing".to_string()
            })
        );

        let result: TranslationResult<Vec<DetectItem>> =
            parse_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            result,
            Err(TranslationError::ServiceError { code: 502, .. })
        ));
    }

    #[test]
    fn test_success_array_is_not_mistaken_for_error() {
        let body = r#"[{"code":1,"message":"looks like an error"}]"#;
        let result: TranslationResult<Vec<serde_json::Value>> = parse_body(StatusCode::OK, body);
        assert_eq!(result.unwrap().len(), 1);

        let body = r#"{"error":"quota exceeded"}"#;
        let result: TranslationResult<Vec<DetectItem>> = parse_body(StatusCode::FORBIDDEN, body);
        assert!(matches!(
            result,
            Err(TranslationError::ServiceError { code: 403, .. })
        ));
    }

    #[test]
    fn test_parse_translation_body() {
        let body = r#"[{"translations":[{"text":"Hello","to":"en"}]}]"#;
        let items: Vec<TranslateOutput> = parse_body(StatusCode::OK, body).unwrap();
        assert_eq!(items[0].clone().into_text().unwrap(), "Hello");
    }
}
