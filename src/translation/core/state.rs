//! 翻译状态机
//!
//! `TranslationState` 是会话中唯一的可变状态，只能通过 [`TranslationState::reduce`]
//! 接收具名事件来变化。状态转换是纯函数：相同的状态与事件总是得到相同的结果。

use serde::Serialize;

use crate::translation::language::{Language, SourceLanguage};

/// 翻译请求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// 录音子状态，与翻译状态正交
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    #[default]
    Idle,
    Recording,
    Stopped,
}

/// 会话状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationState {
    pub input: String,
    pub selected_language: SourceLanguage,
    /// 仅在 `selected_language == Auto` 时有意义
    pub detected_language: SourceLanguage,
    pub target_language: Language,
    pub translated_text: String,
    pub status: TranslationStatus,
    pub error_message: String,
    /// 当前错误来自速率限制拒绝
    pub limit_exceeded: bool,
    pub recording_status: RecordingStatus,
}

/// 状态机事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    InputChange(String),
    InputClear,
    SelectedLanguageChange(SourceLanguage),
    TargetLanguageChange(Language),
    TranslationStart,
    DetectionDone(Language),
    /// 检测到的语言不在可选列表中，源语言交给后端自动识别
    DetectionUnoffered,
    TranslationSucceeded(String),
    TranslationFailed { message: String, limit_exceeded: bool },
    DetectionError(String),
    RecordingStart,
    RecordingStop,
    RecordingReset,
}

/// 保存翻译时提交的数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSnapshot {
    pub from: String,
    pub to: String,
    pub from_text: String,
    pub to_text: String,
}

impl TranslationState {
    pub fn new(selected_language: SourceLanguage, target_language: Language) -> Self {
        Self {
            selected_language,
            target_language,
            ..Default::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording_status == RecordingStatus::Recording
    }

    /// 实际用于翻译的源语言：手动选择优先，其次是检测结果
    pub fn effective_source(&self) -> SourceLanguage {
        match self.selected_language {
            SourceLanguage::Auto => self.detected_language,
            manual => manual,
        }
    }

    /// 是否允许开始录音（自动检测模式下不提供语音输入）
    pub fn can_record(&self) -> bool {
        !self.selected_language.is_auto() && self.recording_status == RecordingStatus::Idle
    }

    /// 当前结果的可保存快照；没有成功的翻译时为 None
    pub fn snapshot(&self) -> Option<TranslationSnapshot> {
        if self.status != TranslationStatus::Success || self.translated_text.is_empty() {
            return None;
        }

        Some(TranslationSnapshot {
            from: self.effective_source().name().to_string(),
            to: self.target_language.name().to_string(),
            from_text: self.input.clone(),
            to_text: self.translated_text.clone(),
        })
    }

    /// 状态转换函数
    pub fn reduce(mut self, event: TranslationEvent) -> Self {
        match event {
            TranslationEvent::InputChange(text) => {
                if !self.is_recording() {
                    self.input = text;
                }
            }
            TranslationEvent::InputClear => {
                self.input.clear();
                self.translated_text.clear();
                self.error_message.clear();
                self.detected_language = SourceLanguage::Auto;
                self.status = TranslationStatus::Idle;
                self.limit_exceeded = false;
            }
            TranslationEvent::SelectedLanguageChange(language) => {
                self.selected_language = language;
                self.detected_language = SourceLanguage::Auto;
            }
            TranslationEvent::TargetLanguageChange(language) => {
                self.target_language = language;
            }
            TranslationEvent::TranslationStart => {
                if !self.is_recording() {
                    self.status = TranslationStatus::Loading;
                    self.error_message.clear();
                    self.limit_exceeded = false;
                }
            }
            TranslationEvent::DetectionDone(language) => {
                if !self.is_recording() && self.selected_language.is_auto() {
                    self.detected_language = SourceLanguage::Manual(language);
                }
            }
            TranslationEvent::DetectionUnoffered => {
                if !self.is_recording() && self.selected_language.is_auto() {
                    self.detected_language = SourceLanguage::Auto;
                }
            }
            TranslationEvent::TranslationSucceeded(text) => {
                if !self.is_recording() {
                    self.status = TranslationStatus::Success;
                    self.translated_text = text;
                }
            }
            TranslationEvent::TranslationFailed {
                message,
                limit_exceeded,
            } => {
                if !self.is_recording() {
                    self.status = TranslationStatus::Error;
                    self.translated_text.clear();
                    self.error_message = message;
                    self.limit_exceeded = limit_exceeded;
                }
            }
            TranslationEvent::DetectionError(message) => {
                self.detected_language = SourceLanguage::Auto;
                self.translated_text.clear();
                if !self.is_recording() {
                    self.status = TranslationStatus::Error;
                    self.error_message = message;
                    self.limit_exceeded = false;
                }
            }
            TranslationEvent::RecordingStart => {
                if self.recording_status == RecordingStatus::Idle {
                    self.recording_status = RecordingStatus::Recording;
                    self.input.clear();
                    self.translated_text.clear();
                    self.error_message.clear();
                    self.status = TranslationStatus::Idle;
                    self.limit_exceeded = false;
                }
            }
            TranslationEvent::RecordingStop => {
                if self.recording_status == RecordingStatus::Recording {
                    self.recording_status = RecordingStatus::Stopped;
                }
            }
            TranslationEvent::RecordingReset => {
                self.recording_status = RecordingStatus::Idle;
            }
        }

        self
    }
}
