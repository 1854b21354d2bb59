//! 翻译编排核心
//!
//! - `state`: 翻译状态机（纯状态转换）
//! - `sequencer`: 按槽位签发代号，丢弃过期结果
//! - `resolver`: 有效源语言解析

pub mod resolver;
pub mod sequencer;
pub mod state;

pub use resolver::{resolve_detection, resolve_source, DetectionOutcome, SourceAction};
pub use sequencer::{RequestSequencer, Slot, Ticket};
pub use state::{
    RecordingStatus, TranslationEvent, TranslationSnapshot, TranslationState, TranslationStatus,
};
