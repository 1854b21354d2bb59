//! 速率限制记录存储
//!
//! 记录按调用方身份分区、按签发时间排序，只追加不修改。行键由
//! [`row_key`] 生成，字典序即时间顺序，因此"窗口内计数"与"早于保留期"
//! 都可以表达为行键上的区间查询。

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::translation::error::TranslationResult;

/// 时间戳部分的位数（毫秒）
const MILLIS_WIDTH: usize = 13;

/// 单条速率限制记录
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    /// 调用方身份
    pub partition_key: String,
    /// 可排序的签发时间
    pub row_key: String,
}

impl RateLimitRecord {
    pub fn new(identity: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: identity.into(),
            row_key: row_key.into(),
        }
    }

    /// 从行键解析签发时间
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.row_key.get(..MILLIS_WIDTH)?.parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

/// 生成行键：13 位毫秒时间戳 + 6 位序号
pub fn row_key(issued_at: DateTime<Utc>, sequence: u64) -> String {
    format!(
        "{}-{:06}",
        cutoff_key(issued_at),
        sequence % 1_000_000
    )
}

/// 生成只含时间戳的边界键，可直接与完整行键比较
pub fn cutoff_key(at: DateTime<Utc>) -> String {
    format!("{:0width$}", at.timestamp_millis().max(0), width = MILLIS_WIDTH)
}

/// 进程内行键序号
#[derive(Debug, Default)]
pub struct RowKeySequence(AtomicU64);

impl RowKeySequence {
    pub fn next_key(&self, issued_at: DateTime<Utc>) -> String {
        let sequence = self.0.fetch_add(1, Ordering::Relaxed);
        row_key(issued_at, sequence)
    }
}

/// 时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动推进的时钟，用于测试和回放
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: std::time::Duration) {
        let step = chrono::Duration::milliseconds(by.as_millis() as i64);
        if let Ok(mut now) = self.now.lock() {
            *now += step;
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = at;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// 速率限制记录存储
///
/// 实现不需要提供计数与插入之间的原子性。
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// 统计身份下行键不早于 `since` 的记录数
    async fn count_since(&self, identity: &str, since: &str) -> TranslationResult<usize>;

    async fn insert(&self, record: &RateLimitRecord) -> TranslationResult<()>;

    /// 列出所有身份下行键早于 `cutoff` 的记录
    async fn list_older_than(&self, cutoff: &str) -> TranslationResult<Vec<RateLimitRecord>>;

    /// 删除单条记录；记录不存在时返回 `Ok(false)`
    async fn delete(&self, identity: &str, row_key: &str) -> TranslationResult<bool>;
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    partitions: DashMap<String, BTreeSet<String>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录总数
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Vec<RateLimitRecord> {
        let mut records: Vec<RateLimitRecord> = self
            .partitions
            .iter()
            .flat_map(|entry| {
                let identity = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|key| RateLimitRecord::new(identity.clone(), key.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        records.sort_by(|a, b| a.row_key.cmp(&b.row_key));
        records
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn count_since(&self, identity: &str, since: &str) -> TranslationResult<usize> {
        Ok(self
            .partitions
            .get(identity)
            .map(|keys| keys.range(since.to_string()..).count())
            .unwrap_or(0))
    }

    async fn insert(&self, record: &RateLimitRecord) -> TranslationResult<()> {
        self.partitions
            .entry(record.partition_key.clone())
            .or_default()
            .insert(record.row_key.clone());
        Ok(())
    }

    async fn list_older_than(&self, cutoff: &str) -> TranslationResult<Vec<RateLimitRecord>> {
        let mut expired = Vec::new();
        for entry in self.partitions.iter() {
            for key in entry.value().range(..cutoff.to_string()) {
                expired.push(RateLimitRecord::new(entry.key().clone(), key.clone()));
            }
        }
        Ok(expired)
    }

    async fn delete(&self, identity: &str, row_key: &str) -> TranslationResult<bool> {
        let removed = self
            .partitions
            .get_mut(identity)
            .map(|mut keys| keys.remove(row_key))
            .unwrap_or(false);
        self.partitions.remove_if(identity, |_, keys| keys.is_empty());
        Ok(removed)
    }
}

#[cfg(feature = "web")]
pub use mongo::MongoRateLimitStore;

#[cfg(feature = "web")]
mod mongo {
    use super::*;

    use bson::doc;
    use futures::stream::TryStreamExt;
    use mongodb::options::IndexOptions;
    use mongodb::{Collection, Database, IndexModel};

    /// MongoDB 存储，每条记录一个文档 `{partitionKey, rowKey}`
    #[derive(Debug, Clone)]
    pub struct MongoRateLimitStore {
        collection: Collection<RateLimitRecord>,
    }

    impl MongoRateLimitStore {
        pub fn new(db: &Database, collection: &str) -> Self {
            Self {
                collection: db.collection::<RateLimitRecord>(collection),
            }
        }

        /// 创建 `(partitionKey, rowKey)` 唯一索引
        pub async fn ensure_indexes(&self) -> TranslationResult<()> {
            let index = IndexModel::builder()
                .keys(doc! { "partitionKey": 1, "rowKey": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection.create_index(index).await?;
            tracing::info!("速率限制索引已就绪");
            Ok(())
        }
    }

    #[async_trait]
    impl RateLimitStore for MongoRateLimitStore {
        async fn count_since(&self, identity: &str, since: &str) -> TranslationResult<usize> {
            let count = self
                .collection
                .count_documents(doc! {
                    "partitionKey": identity,
                    "rowKey": { "$gte": since },
                })
                .await?;
            Ok(count as usize)
        }

        async fn insert(&self, record: &RateLimitRecord) -> TranslationResult<()> {
            self.collection.insert_one(record).await?;
            Ok(())
        }

        async fn list_older_than(&self, cutoff: &str) -> TranslationResult<Vec<RateLimitRecord>> {
            let cursor = self
                .collection
                .find(doc! { "rowKey": { "$lt": cutoff } })
                .await?;
            Ok(cursor.try_collect().await?)
        }

        async fn delete(&self, identity: &str, row_key: &str) -> TranslationResult<bool> {
            let result = self
                .collection
                .delete_one(doc! { "partitionKey": identity, "rowKey": row_key })
                .await?;
            Ok(result.deleted_count > 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_row_keys_sort_chronologically() {
        let early = row_key(at(999_999_999_999), 7);
        let late = row_key(at(1_000_000_000_000), 0);
        assert_eq!(early, "0999999999999-000007");
        assert!(early < late);

        // 边界键与同一毫秒内的行键比较时排在前面
        assert!(cutoff_key(at(1_000_000_000_000)) <= late);
        assert!(cutoff_key(at(1_000_000_000_001)) > late);
    }

    #[test]
    fn test_issued_at_round_trips_millis() {
        let record = RateLimitRecord::new("u1", row_key(at(1_718_000_000_123), 42));
        assert_eq!(record.issued_at(), Some(at(1_718_000_000_123)));
        assert_eq!(RateLimitRecord::new("u1", "garbage").issued_at(), None);
    }

    #[test]
    fn test_sequence_separates_same_millisecond() {
        let sequence = RowKeySequence::default();
        let now = at(1_718_000_000_000);
        assert_ne!(sequence.next_key(now), sequence.next_key(now));
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(at(0));
        clock.advance(std::time::Duration::from_secs(301));
        assert_eq!(clock.now(), at(301_000));
    }

    #[tokio::test]
    async fn test_memory_store_ranges() {
        let store = MemoryRateLimitStore::new();
        for (identity, millis) in [("u1", 1_000), ("u1", 2_000), ("u1", 3_000), ("u2", 1_500)] {
            store
                .insert(&RateLimitRecord::new(identity, row_key(at(millis), 0)))
                .await
                .unwrap();
        }

        assert_eq!(store.count_since("u1", &cutoff_key(at(2_000))).await.unwrap(), 2);
        assert_eq!(store.count_since("u3", &cutoff_key(at(0))).await.unwrap(), 0);

        let expired = store.list_older_than(&cutoff_key(at(2_000))).await.unwrap();
        assert_eq!(expired.len(), 2);

        let first = &expired[0];
        assert!(store.delete(&first.partition_key, &first.row_key).await.unwrap());
        assert!(!store.delete(&first.partition_key, &first.row_key).await.unwrap());
        assert_eq!(store.len(), 3);
    }
}
