//! MongoDB 翻译历史
//!
//! 每个用户一个文档，翻译记录保存在 `translations` 数组中：保存用 `$push`
//! 并在用户不存在时 upsert，删除用 `$pull` 按 `_id` 移除。

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, DateTime};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::{newest_first, HistoryStore, NewTranslation, TranslationRecord};
use crate::translation::error::{helpers, TranslationResult};

/// 数组中的单条翻译
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    timestamp: DateTime,
    from: String,
    to: String,
    from_text: String,
    to_text: String,
}

impl From<TranslationDocument> for TranslationRecord {
    fn from(doc: TranslationDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            timestamp: doc.timestamp.to_chrono(),
            from: doc.from,
            to: doc.to,
            from_text: doc.from_text,
            to_text: doc.to_text,
        }
    }
}

/// 用户文档
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    user_id: String,
    #[serde(default)]
    translations: Vec<TranslationDocument>,
}

fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// MongoDB 翻译历史
#[derive(Debug, Clone)]
pub struct MongoHistoryStore {
    collection: Collection<UserDocument>,
}

impl MongoHistoryStore {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection::<UserDocument>(collection),
        }
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn save(&self, user_id: &str, translation: NewTranslation) -> TranslationResult<String> {
        translation.validate()?;

        let entry = TranslationDocument {
            id: ObjectId::new(),
            timestamp: DateTime::now(),
            from: translation.from,
            to: translation.to,
            from_text: translation.from_text,
            to_text: translation.to_text,
        };
        let id = entry.id.to_hex();
        let entry = bson::to_bson(&entry)
            .map_err(|e| helpers::store_error(format!("序列化失败: {}", e)))?;

        // 用户不存在时创建
        self.collection
            .update_one(
                doc! { "userId": user_id },
                doc! { "$push": { "translations": entry } },
            )
            .upsert(true)
            .await?;

        tracing::debug!("已为 {} 保存翻译 {}", user_id, id);
        Ok(id)
    }

    async fn list(&self, user_id: &str) -> TranslationResult<Vec<TranslationRecord>> {
        let user = self.collection.find_one(doc! { "userId": user_id }).await?;
        let mut records: Vec<TranslationRecord> = user
            .map(|user| user.translations.into_iter().rev().map(Into::into).collect())
            .unwrap_or_default();
        newest_first(&mut records);
        Ok(records)
    }

    async fn delete(&self, user_id: &str, id: &str) -> TranslationResult<bool> {
        // 格式不合法的 id 不可能存在，与找不到同样处理
        let Some(oid) = parse_id(id) else {
            tracing::debug!("翻译 id 格式无效: {}", id);
            return Ok(false);
        };

        let result = self
            .collection
            .update_one(
                doc! { "userId": user_id },
                doc! { "$pull": { "translations": { "_id": oid } } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }
}
