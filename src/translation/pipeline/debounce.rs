//! 输入防抖
//!
//! 在静默期 `quiet` 内连续到达的值合并为一次输出（最后一个值）。
//! 与上一次输出相同的值不会再次输出；`cancel` 之后不会有任何旧值漏出。
//!
//! 防抖器本身不持有定时器，只记录截止时间，由调用方的事件循环
//! 用 `tokio::time::sleep_until` 等待 [`Debouncer::deadline`] 后调用
//! [`Debouncer::poll_ready`]。

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// 基于截止时间的防抖器
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
    last_emitted: Option<T>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_emitted: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// 记录新值并把截止时间推迟到 `now + quiet`
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet,
        });
    }

    /// 丢弃待输出的值，并忘记上一次输出
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_emitted = None;
    }

    /// 绕过静默期直接输出：丢弃待输出的值，并把 `value` 记为上一次输出
    pub fn settle(&mut self, value: T) {
        self.pending = None;
        self.last_emitted = Some(value);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 截止时间已到则取出待输出的值；与上次输出相同时返回 None
    pub fn poll_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => {}
            _ => return None,
        }

        let value = self.pending.take()?.value;
        if self.last_emitted.as_ref() == Some(&value) {
            return None;
        }

        self.last_emitted = Some(value.clone());
        Some(value)
    }
}
