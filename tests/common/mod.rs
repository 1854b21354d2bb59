// 集成测试公共模块
//
// 提供可编排的假翻译后端、手动时钟与测试环境构建器

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use intersection::rate_limit::{
    ManualClock, MemoryRateLimitStore, PurgeJob, RateLimitConfig, SlidingWindowLimiter,
};
use intersection::translation::language::Language;
use intersection::translation::providers::{
    Detection, TranslateOutput, TranslateRequest, TranslationBackend, Transcription,
};
use intersection::translation::{SessionConfig, SourceLanguage, TranslationError, TranslationResult};

/// 假后端收到的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Detect(String),
    Translate(TranslateRequest),
    Transcribe(Language),
}

/// 可编排的假翻译后端
///
/// 译文为 `"{text} ({to})"`；未编排检测结果的文本检测为荷兰语。
#[derive(Default)]
pub struct FakeBackend {
    detections: Mutex<HashMap<String, (String, bool)>>,
    translate_delays: Mutex<HashMap<String, Duration>>,
    detect_delay: Mutex<Duration>,
    transcription: Mutex<Option<String>>,
    transcribe_delay: Mutex<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn detect_as(&self, text: &str, code: &str, supported: bool) {
        self.detections
            .lock()
            .unwrap()
            .insert(text.to_string(), (code.to_string(), supported));
    }

    pub fn delay_translation(&self, text: &str, delay: Duration) {
        self.translate_delays
            .lock()
            .unwrap()
            .insert(text.to_string(), delay);
    }

    pub fn delay_detection(&self, delay: Duration) {
        *self.detect_delay.lock().unwrap() = delay;
    }

    pub fn transcribe_as(&self, text: &str) {
        *self.transcription.lock().unwrap() = Some(text.to_string());
    }

    pub fn delay_transcription(&self, delay: Duration) {
        *self.transcribe_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn detect_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Detect(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn translate_calls(&self) -> Vec<TranslateRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Translate(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// 假后端的译文格式
pub fn fake_translation(text: &str, to: Language) -> String {
    format!("{} ({})", text, to.code())
}

#[async_trait]
impl TranslationBackend for FakeBackend {
    async fn detect(&self, text: &str) -> TranslationResult<Detection> {
        self.record(Call::Detect(text.to_string()));
        let delay = *self.detect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (language, supported) = self
            .detections
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| ("nl".to_string(), true));

        Ok(Detection {
            language,
            supported,
            score: 0.99,
        })
    }

    async fn translate(&self, request: &TranslateRequest) -> TranslationResult<TranslateOutput> {
        self.record(Call::Translate(request.clone()));
        let delay = self
            .translate_delays
            .lock()
            .unwrap()
            .get(&request.text)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(TranslateOutput::single(
            fake_translation(&request.text, request.to),
            request.to,
        ))
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        language: Language,
    ) -> TranslationResult<Transcription> {
        self.record(Call::Transcribe(language));
        let delay = *self.transcribe_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if audio.is_empty() {
            return Err(TranslationError::InvalidInput("empty audio".to_string()));
        }

        match self.transcription.lock().unwrap().clone() {
            Some(text) => Ok(Transcription {
                display_text: text,
                recognition_status: "Success".to_string(),
            }),
            None => Ok(Transcription {
                display_text: String::new(),
                recognition_status: "NoMatch".to_string(),
            }),
        }
    }
}

/// 测试环境：假后端 + 内存存储 + 手动时钟
pub struct TestEnvironment {
    pub backend: Arc<FakeBackend>,
    pub store: Arc<MemoryRateLimitStore>,
    pub clock: ManualClock,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub purge_job: Arc<PurgeJob>,
}

impl TestEnvironment {
    pub fn new(config: RateLimitConfig) -> Self {
        let backend = FakeBackend::new();
        let store = Arc::new(MemoryRateLimitStore::new());
        let clock = ManualClock::new(Utc.timestamp_opt(1_718_000_000, 0).unwrap());
        let limiter = Arc::new(SlidingWindowLimiter::new(
            store.clone(),
            Arc::new(clock.clone()),
            config.clone(),
        ));
        let purge_job = Arc::new(PurgeJob::new(
            store.clone(),
            Arc::new(clock.clone()),
            config.retention,
        ));

        Self {
            backend,
            store,
            clock,
            limiter,
            purge_job,
        }
    }

    pub fn with_limit(max_requests: usize) -> Self {
        Self::new(RateLimitConfig {
            window: Duration::from_secs(300),
            max_requests,
            retention: Duration::from_secs(15 * 60),
        })
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::with_limit(100)
    }
}

/// 测试用会话配置
pub fn session_config(source: SourceLanguage) -> SessionConfig {
    SessionConfig {
        debounce: Duration::from_millis(200),
        source,
        target: Language::English,
    }
}
