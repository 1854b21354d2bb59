//! Web 服务器配置
//!
//! 使用类型安全的环境变量系统进行配置管理

use std::time::Duration;

use crate::env::{EnvError, EnvResult, EnvVar};

/// MongoDB 配置
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// MongoDB 连接字符串
    pub connection_string: String,
    /// 数据库名称
    pub database_name: String,
    /// 速率限制记录集合
    pub rate_limit_collection: String,
    /// 翻译历史集合
    pub history_collection: String,
}

impl MongoConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::mongodb;

        Ok(Self {
            connection_string: mongodb::ConnectionString::get()?,
            database_name: mongodb::DatabaseName::get()?,
            rate_limit_collection: mongodb::RateLimitCollection::get()?,
            history_collection: mongodb::HistoryCollection::get()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        use crate::env::mongodb;

        if self.connection_string.is_empty() {
            return Err(EnvError {
                variable: mongodb::ConnectionString::NAME.to_string(),
                message: "Connection string cannot be empty".to_string(),
            });
        }

        if self.rate_limit_collection == self.history_collection {
            return Err(EnvError {
                variable: mongodb::HistoryCollection::NAME.to_string(),
                message: "History and rate-limit records need separate collections".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load MongoDB config from environment: {}. Using defaults.", e);
            Self {
                connection_string: "mongodb://localhost:27017".to_string(),
                database_name: "intersection".to_string(),
                rate_limit_collection: "rate_limits".to_string(),
                history_collection: "users".to_string(),
            }
        })
    }
}

/// Web 服务器配置
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// 静态文件目录
    pub static_dir: Option<String>,
    /// MongoDB 配置；为空时使用内存存储
    pub mongo_config: Option<MongoConfig>,
    /// 进程内清理间隔；为空时只能通过清理接口触发
    pub purge_interval: Option<Duration>,
}

impl WebConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        use crate::env::{rate_limit, web};

        let static_dir = web::StaticDir::get()?;

        Ok(Self {
            bind_addr: web::BindAddress::get()?,
            port: web::Port::get()?,
            static_dir: (!static_dir.is_empty()).then_some(static_dir),
            mongo_config: Some(MongoConfig::from_env()?),
            purge_interval: Some(rate_limit::PurgeInterval::get()?),
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        use crate::env::web;

        if self.bind_addr.is_empty() {
            return Err(EnvError {
                variable: web::BindAddress::NAME.to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: web::Port::NAME.to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if let Some(ref static_dir) = self.static_dir {
            if !std::path::Path::new(static_dir).exists() {
                tracing::warn!("Static directory '{}' does not exist", static_dir);
            }
        }

        if let Some(ref mongo_config) = self.mongo_config {
            mongo_config.validate()?;
        }

        Ok(())
    }

    /// 服务地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load web config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "127.0.0.1".to_string(),
                port: 3001,
                static_dir: None,
                mongo_config: Some(MongoConfig::default()),
                purge_interval: Some(Duration::from_secs(3600)),
            }
        })
    }
}
