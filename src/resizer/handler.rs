//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageResizer` 只负责流程编排，不直接与 HTTP 框架绑定。
//! 处理链路固定为：
//! 1. （可选）查询结果缓存
//! 2. 拉取源站字节
//! 3. 在阻塞线程池中执行变换引擎
//! 4. （可选）写入结果缓存
//!
//! ## 实现思路
//!
//! - HTTP 客户端在构建时创建并复用。
//! - 变换属于 CPU 密集型操作，放入 `spawn_blocking`，避免阻塞异步工作线程。
//! - 记录 `load/transform/total` 阶段耗时，便于性能诊断。
//! - 缓存默认关闭；开启后以 (key, 尺寸, exact, freeze) 为键，仅按 LRU 淘汰。

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Instant;

use lru::LruCache;

use super::loader::{build_http_client, redact_url_for_log};
use super::pipeline::resize_to_fit;
use super::{FitSpec, ImageBlob, ResizeError, ResizedImage, ResizerConfig};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct CacheKey {
    key: String,
    fit: FitSpec,
}

/// 图片缩放器。
///
/// 封装了配置、HTTP 客户端与可选结果缓存，并编排拉取与变换。
pub struct ImageResizer {
    pub(super) config: ResizerConfig,
    pub(super) client: reqwest::Client,
    pub(super) cache: Option<Mutex<LruCache<CacheKey, ResizedImage>>>,
}

impl ImageResizer {
    /// 根据配置创建缩放器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_resizer::resizer::{ImageResizer, ResizerConfig};
    ///
    /// let resizer = ImageResizer::new(ResizerConfig {
    ///     base_url: "https://assets.example.com/".into(),
    ///     ..ResizerConfig::default()
    /// })?;
    /// # Ok::<(), image_resizer::resizer::ResizeError>(())
    /// ```
    pub fn new(config: ResizerConfig) -> Result<Self, ResizeError> {
        let client = build_http_client(&config)?;
        let cache =
            NonZeroUsize::new(config.cache_entries).map(|cap| Mutex::new(LruCache::new(cap)));

        Ok(Self {
            config,
            client,
            cache,
        })
    }

    pub fn config(&self) -> &ResizerConfig {
        &self.config
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.config.base_url, key)
    }

    /// 原样透传：不经过变换引擎。
    pub async fn passthrough(&self, key: &str) -> Result<ImageBlob, ResizeError> {
        self.fetch_image_bytes(&self.url_for(key)).await
    }

    /// 处理主入口：拉取并按 `fit` 变换。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_resizer::resizer::{FitSpec, ImageResizer, ResizerConfig, Size};
    ///
    /// # async fn demo() -> Result<(), image_resizer::resizer::ResizeError> {
    /// let resizer = ImageResizer::new(ResizerConfig {
    ///     base_url: "https://assets.example.com/".into(),
    ///     ..ResizerConfig::default()
    /// })?;
    /// let fit = FitSpec { size: Size::new(144, 168), ..FitSpec::default() };
    /// let resized = resizer.resize("watchface.png", fit).await?;
    /// println!("{} {} bytes", resized.mimetype, resized.bytes.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resize(&self, key: &str, fit: FitSpec) -> Result<ResizedImage, ResizeError> {
        let cache_key = CacheKey {
            key: key.to_string(),
            fit,
        };
        if let Some(cached) = self.get_cached(&cache_key) {
            log::debug!("♻️ 命中结果缓存 - key={} size={}", key, fit.size);
            return Ok(cached);
        }

        let total_start = Instant::now();
        let url = self.url_for(key);

        let load_start = Instant::now();
        let blob = self.fetch_image_bytes(&url).await.map_err(|e| {
            log::warn!("⚠️ 拉取失败 - URL: {} err={}", redact_url_for_log(&url), e);
            ResizeError::FetchFailed(format!("failed to fetch image: {}", e))
        })?;
        let load_elapsed = load_start.elapsed();

        let transform_start = Instant::now();
        let max_size = self.config.max_size;
        let resized = tokio::task::spawn_blocking(move || resize_to_fit(blob, fit, max_size))
            .await
            .map_err(|e| ResizeError::ResizeFailed(format!("变换任务异常退出：{}", e)))??;
        let transform_elapsed = transform_start.elapsed();

        self.store_cached(cache_key, &resized);

        log::info!(
            "✅ 图片处理完成 - key={} size={} mimetype={} load={}ms transform={}ms total={}ms",
            key,
            fit.size,
            resized.mimetype,
            load_elapsed.as_millis(),
            transform_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(resized)
    }

    fn get_cached(&self, key: &CacheKey) -> Option<ResizedImage> {
        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().ok()?;
        guard.get(key).cloned()
    }

    fn store_cached(&self, key: CacheKey, value: &ResizedImage) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        match cache.lock() {
            Ok(mut guard) => {
                guard.put(key, value.clone());
            }
            Err(_) => log::warn!("⚠️ 结果缓存锁已中毒，跳过写入"),
        }
    }
}
