//! 速率限制清理触发器
//!
//! 携带共享密钥调用清理接口，默认执行一次；指定 `--every` 时按间隔循环执行。

use std::time::Duration;

use clap::Parser;
use reqwest::header::AUTHORIZATION;

use intersection::env::{self, rate_limit, translator, EnvVar};
use intersection::rate_limit::PurgeReport;

#[derive(Parser, Debug)]
#[command(name = "intersection-purge", version, about = "Trigger the rate-limit purge endpoint")]
struct Args {
    /// 清理接口地址，覆盖 PURGE_RATE_LIMIT_ENDPOINT
    #[arg(long)]
    endpoint: Option<String>,

    /// 循环执行的间隔秒数
    #[arg(long)]
    every: Option<u64>,
}

async fn trigger(
    client: &reqwest::Client,
    endpoint: &str,
    key: &str,
) -> Result<PurgeReport, Box<dyn std::error::Error>> {
    let response = client
        .post(endpoint)
        .header(AUTHORIZATION, format!("Bearer {}", key))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("purge endpoint returned {}: {}", status, body).into());
    }

    Ok(response.json::<PurgeReport>().await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env::load_dotenv();
    tracing_subscriber::fmt().init();

    let key = rate_limit::PurgeKey::get()?;
    let endpoint = match args.endpoint {
        Some(endpoint) => rate_limit::PurgeEndpoint::parse(&endpoint)?,
        None => rate_limit::PurgeEndpoint::get()?,
    };
    let client = reqwest::Client::builder()
        .timeout(translator::RequestTimeout::get()?)
        .build()?;

    let Some(every) = args.every else {
        let report = trigger(&client, &endpoint, &key).await?;
        tracing::info!("清理完成: 删除 {} 条", report.delete_count);
        return Ok(());
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(every.max(60)));
    loop {
        ticker.tick().await;
        match trigger(&client, &endpoint, &key).await {
            Ok(report) => tracing::info!("清理完成: 删除 {} 条", report.delete_count),
            Err(e) => tracing::error!("清理触发失败: {}", e),
        }
    }
}
