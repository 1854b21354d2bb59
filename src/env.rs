//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理，覆盖翻译服务、速率限制、Web 与 MongoDB 配置

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 应用运行模式
    pub struct Mode;
    impl EnvVar<String> for Mode {
        const NAME: &'static str = "INTERSECTION_MODE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Application mode: development, staging, production";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("production".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "development" | "dev" => Ok("development".to_string()),
                "staging" | "stage" => Ok("staging".to_string()),
                "production" | "prod" => Ok("production".to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid mode '{}'. Use: development, staging, production",
                        value
                    ),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "INTERSECTION_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译服务提供方（Azure Translator / Speech）相关环境变量
pub mod translator {
    use super::*;

    /// Translator API 地址
    pub struct Endpoint;
    impl EnvVar<String> for Endpoint {
        const NAME: &'static str = "AZURE_TRANSLATE_ENDPOINT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Azure Translator endpoint URL";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("https://api.cognitive.microsofttranslator.com/".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Endpoint must start with http:// or https://".to_string(),
                })
            }
        }
    }

    /// 订阅密钥
    pub struct Key;
    impl EnvVar<String> for Key {
        const NAME: &'static str = "AZURE_TRANSLATE_KEY";
        const DEFAULT: Option<String> = None; // 无默认值，必须设置
        const DESCRIPTION: &'static str = "Azure Translator subscription key";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Subscription key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 订阅区域
    pub struct Region;
    impl EnvVar<String> for Region {
        const NAME: &'static str = "AZURE_TRANSLATE_REGION";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Azure Translator subscription region";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("westeurope".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_identifier(value, Self::NAME)
        }
    }

    /// Speech 服务密钥
    pub struct SpeechKey;
    impl EnvVar<String> for SpeechKey {
        const NAME: &'static str = "AZURE_SPEECH_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Azure Speech subscription key";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    /// Speech 服务区域
    pub struct SpeechRegion;
    impl EnvVar<String> for SpeechRegion {
        const NAME: &'static str = "AZURE_SPEECH_REGION";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Azure Speech region";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("westeurope".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_identifier(value, Self::NAME)
        }
    }

    /// 请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "AZURE_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15));
        const DESCRIPTION: &'static str = "Provider request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 120)
        }
    }
}

/// 翻译会话相关环境变量
pub mod session {
    use super::*;

    /// 输入防抖时间
    pub struct DebounceMs;
    impl EnvVar<Duration> for DebounceMs {
        const NAME: &'static str = "INTERSECTION_DEBOUNCE_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(200));
        const DESCRIPTION: &'static str = "Quiet period before a typed input is translated, in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_positive_usize(value, Self::NAME, 10, 5000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }
}

/// 速率限制相关环境变量
pub mod rate_limit {
    use super::*;

    /// 滑动窗口长度
    pub struct Window;
    impl EnvVar<Duration> for Window {
        const NAME: &'static str = "INTERSECTION_RATE_LIMIT_WINDOW";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(300));
        const DESCRIPTION: &'static str = "Sliding window length in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 86400)
        }
    }

    /// 窗口内最大请求数
    pub struct MaxRequests;
    impl EnvVar<usize> for MaxRequests {
        const NAME: &'static str = "INTERSECTION_RATE_LIMIT_MAX_REQUESTS";
        const DEFAULT: Option<usize> = Some(100);
        const DESCRIPTION: &'static str = "Maximum accepted requests per identity within the window";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100000)
        }
    }

    /// 记录保留时长
    pub struct Retention;
    impl EnvVar<Duration> for Retention {
        const NAME: &'static str = "INTERSECTION_RATE_LIMIT_RETENTION";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15 * 60));
        const DESCRIPTION: &'static str = "Age in seconds after which rate-limit records are purged";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 1, 86400 * 7)
        }
    }

    /// 清理任务间隔
    pub struct PurgeInterval;
    impl EnvVar<Duration> for PurgeInterval {
        const NAME: &'static str = "INTERSECTION_PURGE_INTERVAL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(3600));
        const DESCRIPTION: &'static str = "Interval in seconds between scheduled purge sweeps";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_seconds(value, Self::NAME, 60, 86400)
        }
    }

    /// 清理接口共享密钥
    pub struct PurgeKey;
    impl EnvVar<String> for PurgeKey {
        const NAME: &'static str = "PURGE_RATE_LIMIT_KEY";
        const DEFAULT: Option<String> = None; // 无默认值，必须设置
        const DESCRIPTION: &'static str = "Shared secret bearer credential for the purge endpoint";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.len() < 16 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Purge key must be at least 16 characters".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }

    /// 清理接口地址（外部触发器使用）
    pub struct PurgeEndpoint;
    impl EnvVar<String> for PurgeEndpoint {
        const NAME: &'static str = "PURGE_RATE_LIMIT_ENDPOINT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Purge endpoint URL called by the external trigger";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("http://127.0.0.1:3001/api/purge-rate-limit".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Endpoint must start with http:// or https://".to_string(),
                })
            }
        }
    }
}

/// Web服务器相关环境变量
pub mod web {
    use super::*;

    /// 绑定地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "INTERSECTION_WEB_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Web server bind address";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let addr = value.trim();
            if addr.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Address cannot be empty".to_string(),
                });
            }
            Ok(addr.to_string())
        }
    }

    /// 端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "INTERSECTION_WEB_PORT";
        const DEFAULT: Option<u16> = Some(3001);
        const DESCRIPTION: &'static str = "Web server port";

        fn parse(value: &str) -> EnvResult<u16> {
            let port: u16 = value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: "Must be a valid port number (1-65535)".to_string(),
            })?;

            if port == 0 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                });
            }

            Ok(port)
        }
    }

    /// 静态文件目录
    pub struct StaticDir;
    impl EnvVar<String> for StaticDir {
        const NAME: &'static str = "INTERSECTION_WEB_STATIC_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Static files directory (empty to disable)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(String::new()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// MongoDB相关环境变量
pub mod mongodb {
    use super::*;

    /// MongoDB连接字符串
    pub struct ConnectionString;
    impl EnvVar<String> for ConnectionString {
        const NAME: &'static str = "MONGODB_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "MongoDB connection string";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("mongodb://localhost:27017".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let url = value.trim();
            if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
                Ok(url.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "MongoDB URL must start with mongodb:// or mongodb+srv://"
                        .to_string(),
                })
            }
        }
    }

    /// 数据库名称
    pub struct DatabaseName;
    impl EnvVar<String> for DatabaseName {
        const NAME: &'static str = "MONGODB_DATABASE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "MongoDB database name";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("intersection".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 速率限制记录集合
    pub struct RateLimitCollection;
    impl EnvVar<String> for RateLimitCollection {
        const NAME: &'static str = "MONGODB_RATE_LIMIT_COLLECTION";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Collection holding rate-limit records";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("rate_limits".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// 翻译历史集合
    pub struct HistoryCollection;
    impl EnvVar<String> for HistoryCollection {
        const NAME: &'static str = "MONGODB_HISTORY_COLLECTION";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Collection holding saved translations per user";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("users".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_seconds(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let seconds = parse_positive_usize(value, var_name, min as usize, max as usize)?;
    Ok(Duration::from_secs(seconds as u64))
}

fn parse_non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let name = value.trim();
    if name.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(name.to_string())
}

fn parse_identifier(value: &str, var_name: &str) -> EnvResult<String> {
    let ident = parse_non_empty(value, var_name)?.to_lowercase();
    if !ident.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid region '{}'", value),
        });
    }
    Ok(ident)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub mode: String,
    pub log_level: String,

    // 翻译服务配置
    pub translator_endpoint: String,
    pub translator_key: Option<String>,
    pub translator_region: String,
    pub speech_region: String,

    // 会话配置
    pub debounce: Duration,

    // 速率限制配置
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: usize,
    pub rate_limit_retention: Duration,
    pub purge_interval: Duration,
    pub purge_key: Option<String>,

    // Web配置
    pub web_bind_address: String,
    pub web_port: u16,

    // MongoDB配置
    pub mongodb_connection_string: String,
    pub mongodb_database_name: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            mode: core::Mode::get()?,
            log_level: core::LogLevel::get()?,

            translator_endpoint: translator::Endpoint::get()?,
            translator_key: translator::Key::get().ok(),
            translator_region: translator::Region::get()?,
            speech_region: translator::SpeechRegion::get()?,

            debounce: session::DebounceMs::get()?,

            rate_limit_window: rate_limit::Window::get()?,
            rate_limit_max_requests: rate_limit::MaxRequests::get()?,
            rate_limit_retention: rate_limit::Retention::get()?,
            purge_interval: rate_limit::PurgeInterval::get()?,
            purge_key: rate_limit::PurgeKey::get().ok(),

            web_bind_address: web::BindAddress::get()?,
            web_port: web::Port::get()?,

            mongodb_connection_string: mongodb::ConnectionString::get()?,
            mongodb_database_name: mongodb::DatabaseName::get()?,
        })
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.rate_limit_retention < self.rate_limit_window {
            return Err(EnvError {
                variable: rate_limit::Retention::NAME.to_string(),
                message: format!(
                    "Retention ({}s) must not be shorter than the rate-limit window ({}s)",
                    self.rate_limit_retention.as_secs(),
                    self.rate_limit_window.as_secs()
                ),
            });
        }
        Ok(())
    }

    /// 打印配置摘要（隐藏敏感信息）
    pub fn print_summary(&self) {
        println!("Environment Configuration Summary:");
        println!("  Mode: {}", self.mode);
        println!("  Log Level: {}", self.log_level);
        println!("  Translator: {} ({})", self.translator_endpoint, self.translator_region);
        if self.translator_key.is_some() {
            println!("  Translator Key: [configured]");
        }
        println!(
            "  Rate Limit: {} requests / {}s, retention {}s",
            self.rate_limit_max_requests,
            self.rate_limit_window.as_secs(),
            self.rate_limit_retention.as_secs()
        );
        if self.purge_key.is_some() {
            println!("  Purge Key: [configured]");
        }
        println!("  Web Server: {}:{}", self.web_bind_address, self.web_port);
        println!("  MongoDB Database: {}", self.mongodb_database_name);
    }
}

/// 按优先级加载第一个存在的 .env 文件
#[cfg(feature = "web")]
pub fn load_dotenv() -> Option<&'static str> {
    let env_files = [".env.local", ".env.development", ".env.production", ".env"];

    for env_file in env_files {
        if std::path::Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
            tracing::info!("已加载环境变量文件: {}", env_file);
            return Some(env_file);
        }
    }
    None
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    push_doc(&mut docs, core::Mode::NAME, core::Mode::DESCRIPTION);
    push_doc(&mut docs, core::LogLevel::NAME, core::LogLevel::DESCRIPTION);

    docs.push_str("\n## Translator Configuration\n\n");
    push_doc(&mut docs, translator::Endpoint::NAME, translator::Endpoint::DESCRIPTION);
    push_doc(&mut docs, translator::Key::NAME, translator::Key::DESCRIPTION);
    push_doc(&mut docs, translator::Region::NAME, translator::Region::DESCRIPTION);
    push_doc(&mut docs, translator::SpeechKey::NAME, translator::SpeechKey::DESCRIPTION);
    push_doc(&mut docs, translator::SpeechRegion::NAME, translator::SpeechRegion::DESCRIPTION);
    push_doc(&mut docs, translator::RequestTimeout::NAME, translator::RequestTimeout::DESCRIPTION);

    docs.push_str("\n## Session Configuration\n\n");
    push_doc(&mut docs, session::DebounceMs::NAME, session::DebounceMs::DESCRIPTION);

    docs.push_str("\n## Rate Limit Configuration\n\n");
    push_doc(&mut docs, rate_limit::Window::NAME, rate_limit::Window::DESCRIPTION);
    push_doc(&mut docs, rate_limit::MaxRequests::NAME, rate_limit::MaxRequests::DESCRIPTION);
    push_doc(&mut docs, rate_limit::Retention::NAME, rate_limit::Retention::DESCRIPTION);
    push_doc(&mut docs, rate_limit::PurgeInterval::NAME, rate_limit::PurgeInterval::DESCRIPTION);
    push_doc(&mut docs, rate_limit::PurgeKey::NAME, rate_limit::PurgeKey::DESCRIPTION);
    push_doc(&mut docs, rate_limit::PurgeEndpoint::NAME, rate_limit::PurgeEndpoint::DESCRIPTION);

    docs.push_str("\n## Web Server Configuration\n\n");
    push_doc(&mut docs, web::BindAddress::NAME, web::BindAddress::DESCRIPTION);
    push_doc(&mut docs, web::Port::NAME, web::Port::DESCRIPTION);
    push_doc(&mut docs, web::StaticDir::NAME, web::StaticDir::DESCRIPTION);

    docs.push_str("\n## MongoDB Configuration\n\n");
    push_doc(&mut docs, mongodb::ConnectionString::NAME, mongodb::ConnectionString::DESCRIPTION);
    push_doc(&mut docs, mongodb::DatabaseName::NAME, mongodb::DatabaseName::DESCRIPTION);
    push_doc(&mut docs, mongodb::RateLimitCollection::NAME, mongodb::RateLimitCollection::DESCRIPTION);
    push_doc(&mut docs, mongodb::HistoryCollection::NAME, mongodb::HistoryCollection::DESCRIPTION);

    docs
}

fn push_doc(docs: &mut String, name: &str, description: &str) {
    docs.push_str(&format!("- `{}`: {}\n", name, description));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_mode_parsing() {
        assert_eq!(core::Mode::parse("development").unwrap(), "development");
        assert_eq!(core::Mode::parse("PROD").unwrap(), "production");
        assert!(core::Mode::parse("invalid").is_err());
    }

    #[test]
    fn test_rate_limit_parsing() {
        assert_eq!(rate_limit::Window::parse("300").unwrap(), Duration::from_secs(300));
        assert!(rate_limit::Window::parse("0").is_err());
        assert!(rate_limit::Window::parse("abc").is_err());

        assert_eq!(rate_limit::MaxRequests::parse("100").unwrap(), 100);
        assert!(rate_limit::MaxRequests::parse("0").is_err());
    }

    #[test]
    fn test_purge_key_validation() {
        assert!(rate_limit::PurgeKey::parse("short").is_err());
        assert_eq!(
            rate_limit::PurgeKey::parse("  0123456789abcdef  ").unwrap(),
            "0123456789abcdef"
        );
    }

    #[test]
    fn test_debounce_parsing() {
        assert_eq!(session::DebounceMs::parse("250").unwrap(), Duration::from_millis(250));
        assert!(session::DebounceMs::parse("1").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(translator::Endpoint::parse("https://api.cognitive.microsofttranslator.com/").is_ok());
        assert!(translator::Endpoint::parse("ftp://example.com").is_err());
        assert!(mongodb::ConnectionString::parse("mongodb+srv://cluster").is_ok());
        assert!(mongodb::ConnectionString::parse("postgres://db").is_err());
    }

    #[test]
    fn test_region_validation() {
        assert_eq!(translator::Region::parse("WestEurope").unwrap(), "westeurope");
        assert!(translator::Region::parse("west europe").is_err());
    }

    #[test]
    fn test_retention_must_cover_window() {
        let mut config = EnvConfig {
            mode: "development".to_string(),
            log_level: "info".to_string(),
            translator_endpoint: "https://example.com/".to_string(),
            translator_key: None,
            translator_region: "westeurope".to_string(),
            speech_region: "westeurope".to_string(),
            debounce: Duration::from_millis(200),
            rate_limit_window: Duration::from_secs(300),
            rate_limit_max_requests: 100,
            rate_limit_retention: Duration::from_secs(900),
            purge_interval: Duration::from_secs(3600),
            purge_key: None,
            web_bind_address: "127.0.0.1".to_string(),
            web_port: 3001,
            mongodb_connection_string: "mongodb://localhost:27017".to_string(),
            mongodb_database_name: "intersection".to_string(),
        };
        assert!(config.validate().is_ok());

        config.rate_limit_retention = Duration::from_secs(60);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_docs_cover_rate_limit_section() {
        let docs = generate_env_docs();
        assert!(docs.contains("PURGE_RATE_LIMIT_KEY"));
        assert!(docs.contains("INTERSECTION_RATE_LIMIT_WINDOW"));
    }
}
