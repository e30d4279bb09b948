//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ResizerConfig`，保证运行时行为可观测、可测试。
//! 命令行层（`cli`）只负责收集字符串，校验与换算集中在这里完成。
//!
//! ## 实现思路
//!
//! - `Default` 提供测试可用的最小配置（空 base URL，1000x1000 上限，其余关闭）。
//! - `parse_max_size` 用正则在输入中查找第一个 `WxH`，与历史命令行行为保持一致。
//! - 超时为 `0` 表示不设置，由传输层默认行为决定。

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use super::Size;

/// 预编译的尺寸上限匹配正则（非锚定，取第一处匹配）。
static MAX_SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)x(\d+)").expect("尺寸正则编译失败"));

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_SIZE: Size = Size::new(1000, 1000);

/// 配置校验错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a base URL must be provided")]
    MissingBaseUrl,

    #[error("a listen address is required")]
    MissingListen,

    #[error("expected size in the format WxH, got {0:?}")]
    InvalidMaxSize(String),
}

/// 缩放服务配置。
#[derive(Debug, Clone)]
pub struct ResizerConfig {
    /// 拼接 key 之前的源站前缀。
    pub base_url: String,
    /// 监听地址。
    pub listen: String,
    /// 请求尺寸上限，单轴超过即拒绝。
    pub max_size: Size,
    /// 源站建连超时（秒），`0` 表示不设置。
    pub connect_timeout_secs: u64,
    /// 源站整体请求超时（秒），`0` 表示不设置。
    pub fetch_timeout_secs: u64,
    /// 结果缓存条目数，`0` 表示关闭缓存。
    pub cache_entries: usize,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            listen: DEFAULT_LISTEN.to_string(),
            max_size: DEFAULT_MAX_SIZE,
            connect_timeout_secs: 0,
            fetch_timeout_secs: 0,
            cache_entries: 0,
        }
    }
}

impl ResizerConfig {
    /// 校验必填项。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if self.listen.is_empty() {
            return Err(ConfigError::MissingListen);
        }
        Ok(())
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }

    pub(crate) fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

/// 解析 `WxH` 形式的尺寸上限。
///
/// # 示例
/// ```rust
/// use image_resizer::resizer::{parse_max_size, Size};
///
/// assert_eq!(parse_max_size("800x600")?, Size::new(800, 600));
/// # Ok::<(), image_resizer::resizer::ConfigError>(())
/// ```
pub fn parse_max_size(input: &str) -> Result<Size, ConfigError> {
    let invalid = || ConfigError::InvalidMaxSize(input.to_string());
    let captures = MAX_SIZE_PATTERN.captures(input).ok_or_else(invalid)?;

    let width = captures[1].parse::<u32>().map_err(|_| invalid())?;
    let height = captures[2].parse::<u32>().map_err(|_| invalid())?;

    Ok(Size::new(width, height))
}
