//! 翻译管道模块
//!
//! 把用户输入流变成有序、可丢弃的远程调用：防抖 → 源语言解析 → 按槽位派发 →
//! 只应用最新代号的结果。

pub mod debounce;
pub mod session;

// 重新导出主要类型
pub use debounce::Debouncer;
pub use session::{
    Completion, Dispatch, Pipeline, SessionCommand, SessionConfig, SessionHandle,
    TranslationSession,
};
