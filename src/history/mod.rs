//! 翻译历史
//!
//! 每个用户保存的翻译记录，按时间倒序列出。
//!
//! - `memory`: 进程内存储，用于开发与测试
//! - `mongo`: MongoDB 存储，每个用户一个文档，记录保存在 `translations` 数组中

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::translation::core::TranslationSnapshot;
use crate::translation::error::{helpers, TranslationResult};

pub use memory::MemoryHistoryStore;
pub use mongo::MongoHistoryStore;

/// 已保存的翻译
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub to: String,
    pub from_text: String,
    pub to_text: String,
}

/// 待保存的翻译
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTranslation {
    pub from: String,
    pub to: String,
    pub from_text: String,
    pub to_text: String,
}

impl NewTranslation {
    pub fn validate(&self) -> TranslationResult<()> {
        if self.from_text.trim().is_empty() || self.to_text.trim().is_empty() {
            return Err(helpers::validation_error("translation text cannot be empty"));
        }
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(helpers::validation_error("languages cannot be empty"));
        }
        Ok(())
    }
}

impl From<TranslationSnapshot> for NewTranslation {
    fn from(snapshot: TranslationSnapshot) -> Self {
        Self {
            from: snapshot.from,
            to: snapshot.to,
            from_text: snapshot.from_text,
            to_text: snapshot.to_text,
        }
    }
}

/// 翻译历史存储
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 保存一条翻译，返回其 ID
    async fn save(&self, user_id: &str, translation: NewTranslation) -> TranslationResult<String>;

    /// 列出用户的翻译，最新的在前
    async fn list(&self, user_id: &str) -> TranslationResult<Vec<TranslationRecord>>;

    /// 删除用户的一条翻译；不存在时返回 `Ok(false)`
    async fn delete(&self, user_id: &str, id: &str) -> TranslationResult<bool>;
}

/// 按时间倒序排列（稳定排序，同一时间保留原有顺序）
pub(crate) fn newest_first(records: &mut [TranslationRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
