//! # 命令行参数
//!
//! 仅负责收集参数（命令行优先，环境变量兜底），校验与换算交给 `ResizerConfig`。

use clap::Parser;

use crate::resizer::{ConfigError, DEFAULT_LISTEN, ResizerConfig, parse_max_size};

/// Resize-on-demand image delivery service.
#[derive(Debug, Parser)]
#[command(name = "image-resizer", version, about)]
pub struct Cli {
    /// The base URL to which keys are appended
    #[arg(long, env = "RESIZER_BASE_URL", default_value = "")]
    pub base_url: String,

    /// The address to listen for connections
    #[arg(long, env = "RESIZER_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// The max size of an image
    #[arg(long, env = "RESIZER_MAX_SIZE", default_value = "1000x1000")]
    pub max_size: String,

    /// Origin connect timeout in seconds (0 disables)
    #[arg(long, env = "RESIZER_CONNECT_TIMEOUT_SECS", default_value_t = 0)]
    pub connect_timeout_secs: u64,

    /// Origin request timeout in seconds (0 disables)
    #[arg(long, env = "RESIZER_FETCH_TIMEOUT_SECS", default_value_t = 0)]
    pub fetch_timeout_secs: u64,

    /// Number of resized results kept in memory (0 disables caching)
    #[arg(long, env = "RESIZER_CACHE_ENTRIES", default_value_t = 0)]
    pub cache_entries: usize,
}

impl Cli {
    /// 转换为已校验的运行配置。
    pub fn into_config(self) -> Result<ResizerConfig, ConfigError> {
        let config = ResizerConfig {
            base_url: self.base_url,
            listen: self.listen,
            max_size: parse_max_size(&self.max_size)?,
            connect_timeout_secs: self.connect_timeout_secs,
            fetch_timeout_secs: self.fetch_timeout_secs,
            cache_entries: self.cache_entries,
        };
        config.validate()?;
        Ok(config)
    }
}
