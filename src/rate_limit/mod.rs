//! 速率限制
//!
//! - `store`: 按身份分区、按时间排序的只追加记录存储
//! - `limiter`: 滑动窗口准入判断
//! - `purge`: 过期记录清理及定时调度

pub mod limiter;
pub mod purge;
pub mod store;

pub use limiter::{Admission, RateLimitConfig, SlidingWindowLimiter};
pub use purge::{PurgeJob, PurgeReport, PurgeScheduler};
pub use store::{
    Clock, ManualClock, MemoryRateLimitStore, RateLimitRecord, RateLimitStore, SystemClock,
};

#[cfg(feature = "web")]
pub use store::MongoRateLimitStore;
