//! 内存翻译历史
//!
//! 按用户分片保存在 `DashMap` 中，进程重启后丢失。未配置 MongoDB 时
//! 以及测试中使用。

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use dashmap::DashMap;

use super::{newest_first, HistoryStore, NewTranslation, TranslationRecord};
use crate::translation::error::TranslationResult;

/// 内存翻译历史
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    users: DashMap<String, Vec<TranslationRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn save(&self, user_id: &str, translation: NewTranslation) -> TranslationResult<String> {
        translation.validate()?;

        let record = TranslationRecord {
            id: ObjectId::new().to_hex(),
            timestamp: Utc::now(),
            from: translation.from,
            to: translation.to,
            from_text: translation.from_text,
            to_text: translation.to_text,
        };
        let id = record.id.clone();
        self.users.entry(user_id.to_string()).or_default().push(record);
        Ok(id)
    }

    async fn list(&self, user_id: &str) -> TranslationResult<Vec<TranslationRecord>> {
        let mut records: Vec<TranslationRecord> = self
            .users
            .get(user_id)
            .map(|records| records.iter().rev().cloned().collect())
            .unwrap_or_default();
        newest_first(&mut records);
        Ok(records)
    }

    async fn delete(&self, user_id: &str, id: &str) -> TranslationResult<bool> {
        let Some(mut records) = self.users.get_mut(user_id) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }
}
