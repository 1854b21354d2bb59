//! 翻译会话
//!
//! [`Pipeline`] 是同步的编排核心：接收用户命令与远程调用的完成结果，驱动
//! 状态机，并返回需要派发的远程调用（[`Dispatch`]）。它不做任何 I/O。
//!
//! [`TranslationSession`] 是异步外壳：一个 tokio 任务独占 `Pipeline`，在
//! 命令、完成结果与防抖截止时间之间做 `select!`，把远程调用派生为独立任务，
//! 并通过 `watch` 通道发布状态。
//!
//! 一次流水线运行：防抖输出 → 使两个槽位的在途请求全部失效 → `TranslationStart`
//! → 手动源语言直接翻译，否则先检测。只有票据仍为最新的结果才会进入状态机。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::debounce::Debouncer;
use crate::env::{session, EnvVar};
use crate::translation::core::resolver::{self, DetectionOutcome, SourceAction};
use crate::translation::core::{
    RecordingStatus, RequestSequencer, Slot, Ticket, TranslationEvent, TranslationSnapshot,
    TranslationState,
};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::language::{Language, SourceLanguage};
use crate::translation::providers::{
    Detection, TranslateOutput, TranslateRequest, TranslationBackend, Transcription,
};

/// 用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// 输入框内容变化；空字符串等同于清空
    Input(String),
    Clear,
    SelectSource(SourceLanguage),
    SelectTarget(Language),
    StartRecording,
    /// 停止录音并提交 WAV 音频
    StopRecording(Vec<u8>),
    ResetRecording,
}

/// 需要派发的远程调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Detect { ticket: Ticket, text: String },
    Translate { ticket: Ticket, request: TranslateRequest },
    Transcribe {
        ticket: Ticket,
        audio: Vec<u8>,
        language: Language,
    },
}

/// 远程调用的完成结果
#[derive(Debug, Clone)]
pub enum Completion {
    Detected {
        ticket: Ticket,
        /// 检测时的输入，检测成功后用它翻译
        text: String,
        result: TranslationResult<Detection>,
    },
    Translated {
        ticket: Ticket,
        result: TranslationResult<TranslateOutput>,
    },
    Transcribed {
        ticket: Ticket,
        result: TranslationResult<Transcription>,
    },
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub debounce: Duration,
    pub source: SourceLanguage,
    pub target: Language,
}

impl SessionConfig {
    pub fn from_env() -> crate::env::EnvResult<Self> {
        Ok(Self {
            debounce: session::DebounceMs::get()?,
            source: SourceLanguage::Auto,
            target: Language::English,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("会话配置加载失败，使用默认值: {}", e);
            Self {
                debounce: Duration::from_millis(200),
                source: SourceLanguage::Auto,
                target: Language::English,
            }
        })
    }
}

/// 同步编排核心
#[derive(Debug)]
pub struct Pipeline {
    state: TranslationState,
    sequencer: RequestSequencer,
    debouncer: Debouncer<String>,
}

impl Pipeline {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: TranslationState::new(config.source, config.target),
            sequencer: RequestSequencer::new(),
            debouncer: Debouncer::new(config.debounce),
        }
    }

    pub fn state(&self) -> &TranslationState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<TranslationSnapshot> {
        self.state.snapshot()
    }

    /// 下一次防抖输出的截止时间
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn apply(&mut self, event: TranslationEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event);
    }

    /// 处理用户命令
    pub fn handle(&mut self, command: SessionCommand, now: Instant) -> Vec<Dispatch> {
        match command {
            SessionCommand::Input(text) if text.is_empty() => {
                self.clear();
                Vec::new()
            }
            SessionCommand::Input(text) => {
                if self.state.is_recording() {
                    tracing::trace!("录音中，忽略输入");
                    return Vec::new();
                }
                self.apply(TranslationEvent::InputChange(text.clone()));
                self.debouncer.push(text, now);
                Vec::new()
            }
            SessionCommand::Clear => {
                self.clear();
                Vec::new()
            }
            SessionCommand::SelectSource(language) => {
                self.apply(TranslationEvent::SelectedLanguageChange(language));
                self.rerun()
            }
            SessionCommand::SelectTarget(language) => {
                self.apply(TranslationEvent::TargetLanguageChange(language));
                self.rerun()
            }
            SessionCommand::StartRecording => {
                if !self.state.can_record() {
                    tracing::warn!(
                        "无法开始录音: 源语言 {}, 录音状态 {:?}",
                        self.state.selected_language.name(),
                        self.state.recording_status
                    );
                    return Vec::new();
                }
                self.debouncer.cancel();
                self.sequencer.invalidate_all();
                self.sequencer.invalidate(Slot::Transcription);
                self.apply(TranslationEvent::RecordingStart);
                Vec::new()
            }
            SessionCommand::StopRecording(audio) => {
                if self.state.recording_status != RecordingStatus::Recording {
                    return Vec::new();
                }
                self.apply(TranslationEvent::RecordingStop);
                match self.state.selected_language.language() {
                    Some(language) => {
                        let ticket = self.sequencer.issue(Slot::Transcription);
                        tracing::debug!("派发语音转写 (代号 {})", ticket.generation);
                        vec![Dispatch::Transcribe {
                            ticket,
                            audio,
                            language,
                        }]
                    }
                    None => {
                        self.apply(TranslationEvent::RecordingReset);
                        Vec::new()
                    }
                }
            }
            SessionCommand::ResetRecording => {
                self.sequencer.invalidate(Slot::Transcription);
                self.apply(TranslationEvent::RecordingReset);
                Vec::new()
            }
        }
    }

    /// 防抖截止时间到达
    pub fn on_deadline(&mut self, now: Instant) -> Vec<Dispatch> {
        match self.debouncer.poll_ready(now) {
            Some(text) => self.run(text),
            None => Vec::new(),
        }
    }

    /// 处理远程调用的完成结果
    pub fn complete(&mut self, completion: Completion, now: Instant) -> Vec<Dispatch> {
        match completion {
            Completion::Detected {
                ticket,
                text,
                result,
            } => {
                if !self.accept(&ticket) {
                    return Vec::new();
                }
                self.on_detection(text, result)
            }
            Completion::Translated { ticket, result } => {
                if !self.accept(&ticket) {
                    return Vec::new();
                }
                let event = match result.and_then(TranslateOutput::into_text) {
                    Ok(text) => TranslationEvent::TranslationSucceeded(text),
                    Err(err) => {
                        tracing::warn!("翻译失败: {}", err);
                        TranslationEvent::TranslationFailed {
                            message: err.to_string(),
                            limit_exceeded: err.is_limit_exceeded(),
                        }
                    }
                };
                self.apply(event);
                Vec::new()
            }
            Completion::Transcribed { ticket, result } => {
                if !self.accept(&ticket) {
                    return Vec::new();
                }
                if self.state.recording_status != RecordingStatus::Stopped {
                    tracing::trace!("录音状态 {:?}，丢弃转写结果", self.state.recording_status);
                    return Vec::new();
                }
                self.on_transcription(result, now)
            }
        }
    }

    fn accept(&self, ticket: &Ticket) -> bool {
        if self.sequencer.is_current(ticket) {
            return true;
        }
        tracing::trace!(
            "丢弃过期的{}结果: 代号 {} (当前 {})",
            ticket.slot,
            ticket.generation,
            self.sequencer.current(ticket.slot)
        );
        false
    }

    fn clear(&mut self) {
        self.debouncer.cancel();
        self.sequencer.invalidate_all();
        self.apply(TranslationEvent::InputClear);
    }

    /// 语言变化后立即以当前输入重新运行
    fn rerun(&mut self) -> Vec<Dispatch> {
        if self.state.input.is_empty() || self.state.is_recording() {
            return Vec::new();
        }
        let text = self.state.input.clone();
        self.debouncer.settle(text.clone());
        self.run(text)
    }

    fn run(&mut self, text: String) -> Vec<Dispatch> {
        self.sequencer.invalidate_all();
        self.apply(TranslationEvent::TranslationStart);

        match resolver::resolve_source(self.state.selected_language) {
            SourceAction::UseManual(language) => vec![self.translate(text, Some(language))],
            SourceAction::RunDetection => {
                let ticket = self.sequencer.issue(Slot::Detection);
                tracing::debug!("派发语言检测 (代号 {})", ticket.generation);
                vec![Dispatch::Detect { ticket, text }]
            }
        }
    }

    fn translate(&mut self, text: String, from: Option<Language>) -> Dispatch {
        let ticket = self.sequencer.issue(Slot::Translation);
        let request = TranslateRequest {
            text,
            to: self.state.target_language,
            from,
        };
        tracing::debug!(
            "派发翻译 {} -> {} (代号 {})",
            from.map(Language::code).unwrap_or("auto"),
            request.to.code(),
            ticket.generation
        );
        Dispatch::Translate { ticket, request }
    }

    fn on_detection(&mut self, text: String, result: TranslationResult<Detection>) -> Vec<Dispatch> {
        match resolver::resolve_detection(result) {
            DetectionOutcome::Offered(language) => {
                self.apply(TranslationEvent::DetectionDone(language));
                vec![self.translate(text, Some(language))]
            }
            DetectionOutcome::Unoffered { .. } => {
                self.apply(TranslationEvent::DetectionUnoffered);
                vec![self.translate(text, None)]
            }
            DetectionOutcome::Rejected(err) => {
                self.apply(TranslationEvent::DetectionError(resolver::user_message(&err)));
                Vec::new()
            }
        }
    }

    fn on_transcription(
        &mut self,
        result: TranslationResult<Transcription>,
        now: Instant,
    ) -> Vec<Dispatch> {
        self.apply(TranslationEvent::RecordingReset);
        match result {
            Ok(transcription) if transcription.is_success() => {
                self.handle(SessionCommand::Input(transcription.display_text), now)
            }
            Ok(transcription) => {
                tracing::warn!("语音未识别: {}", transcription.recognition_status);
                Vec::new()
            }
            Err(err) => {
                tracing::error!("语音转写失败: {}", err);
                Vec::new()
            }
        }
    }
}

/// 会话句柄
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<TranslationState>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> TranslationResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| TranslationError::InternalError("session closed".to_string()))
    }

    /// 当前状态的副本
    pub fn state(&self) -> TranslationState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> Option<TranslationSnapshot> {
        self.state.borrow().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<TranslationState> {
        self.state.clone()
    }

    /// 关闭命令通道并等待会话任务结束
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.task.await {
            tracing::error!("会话任务异常退出: {}", e);
        }
    }
}

/// 异步会话驱动
pub struct TranslationSession;

impl TranslationSession {
    pub fn spawn(backend: Arc<dyn TranslationBackend>, config: SessionConfig) -> SessionHandle {
        let pipeline = Pipeline::new(&config);
        let (command_tx, command_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(pipeline.state().clone());

        let task = tokio::spawn(drive(pipeline, backend, command_rx, state_tx));

        SessionHandle {
            commands: command_tx,
            state: state_rx,
            task,
        }
    }
}

async fn drive(
    mut pipeline: Pipeline,
    backend: Arc<dyn TranslationBackend>,
    mut commands: mpsc::Receiver<SessionCommand>,
    state: watch::Sender<TranslationState>,
) {
    let (completion_tx, mut completions) = mpsc::unbounded_channel();
    tracing::debug!("翻译会话已启动");

    loop {
        let deadline = pipeline.deadline();
        let dispatches = tokio::select! {
            command = commands.recv() => match command {
                Some(command) => pipeline.handle(command, Instant::now()),
                None => break,
            },
            Some(completion) = completions.recv() => pipeline.complete(completion, Instant::now()),
            _ = wait_until(deadline) => pipeline.on_deadline(Instant::now()),
        };

        for dispatch in dispatches {
            spawn_dispatch(&backend, &completion_tx, dispatch);
        }

        state.send_if_modified(|current| {
            if current == pipeline.state() {
                false
            } else {
                *current = pipeline.state().clone();
                true
            }
        });
    }

    tracing::debug!("翻译会话已结束");
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn spawn_dispatch(
    backend: &Arc<dyn TranslationBackend>,
    completions: &mpsc::UnboundedSender<Completion>,
    dispatch: Dispatch,
) {
    let backend = Arc::clone(backend);
    let completions = completions.clone();

    tokio::spawn(async move {
        let completion = match dispatch {
            Dispatch::Detect { ticket, text } => {
                let result = backend.detect(&text).await;
                Completion::Detected {
                    ticket,
                    text,
                    result,
                }
            }
            Dispatch::Translate { ticket, request } => Completion::Translated {
                ticket,
                result: backend.translate(&request).await,
            },
            Dispatch::Transcribe {
                ticket,
                audio,
                language,
            } => Completion::Transcribed {
                ticket,
                result: backend.transcribe(audio, language).await,
            },
        };

        // 会话已结束时结果无人接收
        let _ = completions.send(completion);
    });
}
