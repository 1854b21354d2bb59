//! Web 服务器模块
//!
//! 为实时翻译提供 HTTP 接口：检测、受限流保护的翻译、语音转写、
//! 速率限制准入与清理，以及翻译历史。

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::history::{HistoryStore, MemoryHistoryStore, MongoHistoryStore};
use crate::rate_limit::{
    MemoryRateLimitStore, MongoRateLimitStore, PurgeScheduler, RateLimitConfig, RateLimitStore,
    SystemClock,
};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::providers::TranslationBackend;

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    rate_limit: RateLimitConfig,
    purge_key: Option<String>,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig, rate_limit: RateLimitConfig, purge_key: Option<String>) -> Self {
        Self {
            config,
            rate_limit,
            purge_key,
        }
    }

    /// 启动 Web 服务器
    pub async fn start(&self, backend: Arc<dyn TranslationBackend>) -> TranslationResult<()> {
        let (rate_limit_store, history) = self.connect_stores().await;

        let app_state = Arc::new(AppState::new(
            backend,
            rate_limit_store,
            history,
            Arc::new(SystemClock),
            self.rate_limit.clone(),
            self.purge_key.clone(),
        ));

        if self.purge_key.is_none() {
            tracing::warn!("未配置 PURGE_RATE_LIMIT_KEY，清理接口将拒绝所有请求");
        }

        let _scheduler = self.config.purge_interval.map(|every| {
            PurgeScheduler::spawn(Arc::clone(&app_state.purge_job), every)
        });

        let app = create_router(app_state, &self.config);

        let listener = tokio::net::TcpListener::bind(self.config.address())
            .await
            .map_err(|e| TranslationError::ConfigError(format!("Failed to bind server: {}", e)))?;

        tracing::info!("Web server starting at http://{}", self.config.address());

        axum::serve(listener, app)
            .await
            .map_err(|e| TranslationError::InternalError(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// 连接 MongoDB；不可用时退回内存存储
    async fn connect_stores(&self) -> (Arc<dyn RateLimitStore>, Arc<dyn HistoryStore>) {
        let Some(ref mongo) = self.config.mongo_config else {
            tracing::info!("未配置 MongoDB，使用内存存储");
            return memory_stores();
        };

        match connect_mongo(mongo).await {
            Ok(stores) => {
                tracing::info!("MongoDB 连接成功: {}", mongo.database_name);
                stores
            }
            Err(e) => {
                tracing::warn!("MongoDB 连接失败: {}", e);
                tracing::warn!("继续运行，但速率限制记录与翻译历史只保存在内存中");
                memory_stores()
            }
        }
    }
}

fn memory_stores() -> (Arc<dyn RateLimitStore>, Arc<dyn HistoryStore>) {
    (
        Arc::new(MemoryRateLimitStore::new()),
        Arc::new(MemoryHistoryStore::new()),
    )
}

async fn connect_mongo(
    config: &MongoConfig,
) -> TranslationResult<(Arc<dyn RateLimitStore>, Arc<dyn HistoryStore>)> {
    let client = mongodb::Client::with_uri_str(&config.connection_string).await?;
    let db = client.database(&config.database_name);
    db.run_command(bson::doc! { "ping": 1 }).await?;

    let rate_limits = MongoRateLimitStore::new(&db, &config.rate_limit_collection);
    rate_limits.ensure_indexes().await?;
    let history = MongoHistoryStore::new(&db, &config.history_collection);

    Ok((Arc::new(rate_limits), Arc::new(history)))
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let mut app = create_routes().with_state(app_state);

    // 添加CORS支持
    app = app.layer(CorsLayer::permissive());

    // 添加静态文件服务（如果配置了）
    if let Some(static_dir) = &config.static_dir {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    app
}
