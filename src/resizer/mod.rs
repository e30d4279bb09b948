//! # 图片缩放模块（resizer）
//!
//! ## 设计思路
//!
//! 该模块将“路径解析 → 源站拉取 → 解码变换 → 重新编码”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `request`：路径与查询串解析为 `ResizeRequest`（含尺寸上限校验）
//! - `handler`：编排整条处理流水线（含可选结果缓存）
//! - `loader`：负责源站 HTTP 拉取
//! - `pipeline`：变换引擎，GIF 分支 / 快速路径 / Lanczos2 缩放 / 编码策略
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! HTTP 请求
//!    ↓
//! server.rs（路由 + 响应头 + 状态码映射）
//!    ↓
//! request.rs（解析 key / FitSpec）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（GET base_url + key）
//!    └─ pipeline.rs（spawn_blocking 中执行变换）
//!    ↓
//! 返回 ResizedImage 或 ResizeError
//! ```

mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod request;
mod source;

pub use config::{ConfigError, DEFAULT_LISTEN, DEFAULT_MAX_SIZE, ResizerConfig, parse_max_size};
pub use error::ResizeError;
pub use handler::ImageResizer;
pub use pipeline::{MIME_GIF, MIME_JPEG, MIME_PNG, resize_to_fit};
pub use request::{ResizeRequest, parse_request};
pub use source::{DetectedFormat, FitSpec, ImageBlob, ResizedImage, Size};
