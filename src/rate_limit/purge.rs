//! 过期速率限制记录清理
//!
//! 删除所有签发时间早于 `now - retention` 的记录。单条删除失败只记录日志并跳过，
//! 删除不存在的记录视为无操作，因此重复执行是安全的。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::store::{cutoff_key, Clock, RateLimitStore};

/// 一次清理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeReport {
    pub delete_count: usize,
    /// 删除失败而被跳过的记录数
    pub failed_count: usize,
}

/// 清理任务
pub struct PurgeJob {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    retention: Duration,
}

impl PurgeJob {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>, retention: Duration) -> Self {
        Self {
            store,
            clock,
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// 执行一次清理
    pub async fn run(&self) -> PurgeReport {
        let horizon = self.clock.now()
            - chrono::Duration::milliseconds(self.retention.as_millis() as i64);
        let cutoff = cutoff_key(horizon);
        let mut report = PurgeReport::default();

        let expired = match self.store.list_older_than(&cutoff).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("列出过期记录失败: {}", e);
                return report;
            }
        };

        tracing::debug!("清理早于 {} 的 {} 条记录", horizon, expired.len());

        for record in &expired {
            match self.store.delete(&record.partition_key, &record.row_key).await {
                Ok(true) => report.delete_count += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        "删除记录 {}/{} 失败: {}",
                        record.partition_key,
                        record.row_key,
                        e
                    );
                    report.failed_count += 1;
                }
            }
        }

        metrics::counter!("rate_limit_purged_total").increment(report.delete_count as u64);
        tracing::info!(
            "速率限制清理完成: 删除 {} 条, 失败 {} 条",
            report.delete_count,
            report.failed_count
        );
        report
    }
}

/// 进程内定时清理
pub struct PurgeScheduler;

impl PurgeScheduler {
    /// 每隔 `every` 执行一次清理，首次执行在一个周期之后
    pub fn spawn(job: Arc<PurgeJob>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("速率限制清理已调度, 间隔 {}s", every.as_secs());

            loop {
                ticker.tick().await;
                job.run().await;
            }
        })
    }
}
