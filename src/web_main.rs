//! Web 服务器主程序入口

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use intersection::env::{self, EnvConfig};
use intersection::rate_limit::RateLimitConfig;
use intersection::translation::AzureBackend;
use intersection::web::{WebConfig, WebServer};

/// Intersection 实时翻译服务
#[derive(Parser, Debug)]
#[command(name = "intersection-web", version, about)]
struct Args {
    /// 绑定地址，覆盖 INTERSECTION_WEB_BIND_ADDRESS
    #[arg(short, long)]
    bind: Option<String>,

    /// 端口，覆盖 INTERSECTION_WEB_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// 不连接 MongoDB，所有数据只保存在内存中
    #[arg(long)]
    memory: bool,

    /// 不在进程内调度清理任务（由外部触发器调用清理接口）
    #[arg(long)]
    no_scheduler: bool,

    /// 打印环境变量文档后退出
    #[arg(long)]
    env_docs: bool,
}

fn log_level(level: &str) -> LevelFilter {
    match level {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.env_docs {
        println!("{}", env::generate_env_docs());
        return Ok(());
    }

    env::load_dotenv();

    let env_config = EnvConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_max_level(log_level(&env_config.log_level))
        .init();

    env_config.validate()?;
    if env_config.mode != "production" {
        env_config.print_summary();
    }

    let mut web_config = WebConfig::from_env()?;
    if let Some(bind) = args.bind {
        web_config.bind_addr = bind;
    }
    if let Some(port) = args.port {
        web_config.port = port;
    }
    if args.memory {
        web_config.mongo_config = None;
    }
    if args.no_scheduler {
        web_config.purge_interval = None;
    }
    web_config.validate()?;

    let backend = Arc::new(AzureBackend::from_env()?);
    let server = WebServer::new(web_config, RateLimitConfig::from_env()?, env_config.purge_key);
    server.start(backend).await?;

    Ok(())
}
