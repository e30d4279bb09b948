//! # 数据模型与中间结果
//!
//! ## 设计思路
//!
//! 将“请求语义”和“流水线中间结果”解耦：
//! - `Size` / `FitSpec` 表示调用方想要的输出形状
//! - `ImageBlob` 表示已拉取但未解码的源站字节
//! - `ResizedImage` 表示可直接写回响应的字节与真实 MIME
//!
//! 所有类型创建后不可变，生命周期不超过单次请求（缓存命中的 `ResizedImage` 除外）。

use std::fmt;

use bytes::Bytes;

/// 像素包围盒（宽 × 高）。
///
/// 某一轴为 `0` 表示该轴不受约束，具体语义见 `pipeline` 中的零轴换算。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 两个轴都在 `max` 之内（含边界）。
    pub fn fits_within(self, max: Size) -> bool {
        self.width <= max.width && self.height <= max.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 单次请求的变换描述。
///
/// `exact` 仅作为路径语义被解析和携带，缩放始终以 `size` 字面值为目标。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FitSpec {
    pub size: Size,
    pub exact: bool,
    pub freeze_animation: bool,
}

/// 拉取阶段输出：源站字节与源站声明的 MIME。
#[derive(Debug, Clone)]
pub struct ImageBlob {
    /// 源站声明的 `Content-Type`，原样保留（可能为空或不准确）。
    pub declared_mimetype: String,
    /// 完整响应体。
    pub bytes: Bytes,
}

/// 变换阶段输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub mimetype: String,
    pub bytes: Bytes,
}

/// 通用解码器识别出的格式标签。
///
/// GIF 在解码前已按魔数分流，这里只区分需要重新编码的栅格格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Jpeg,
    Png,
    Other(&'static str),
}

impl DetectedFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Other(name) => name,
        }
    }
}

impl From<image::ImageFormat> for DetectedFormat {
    fn from(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => Self::Jpeg,
            image::ImageFormat::Png => Self::Png,
            other => Self::Other(other.extensions_str().first().copied().unwrap_or("unknown")),
        }
    }
}
