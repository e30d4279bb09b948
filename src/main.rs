//! # 按需缩放图片服务 — 应用入口
//!
//! 本文件仅负责日志初始化、参数解析与服务启动。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use image_resizer::cli::Cli;
use image_resizer::resizer::ImageResizer;
use image_resizer::server;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Failed to parse flags: {err}.");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "setup: base_url={} max_size={} cache_entries={}",
        config.base_url,
        config.max_size,
        config.cache_entries
    );

    let resizer = match ImageResizer::new(config) {
        Ok(resizer) => Arc::new(resizer),
        Err(err) => {
            log::error!("setup: 缩放服务初始化失败: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = server::serve(resizer).await {
        log::error!("Serving error: {err}.");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
