//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载缩放链路中的所有错误来源，避免字符串拼接式错误处理。
//! 每个分支对应一种失败条件（拉取 / 解码 / 尺寸不符 / 缩放 / 资源上限 / 编码 / 请求形状），
//! 由 HTTP 边界层按分支选择状态码，而不是统一映射为 400。

/// 缩放链路统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    /// 网络错误、源站非 200、响应体读取失败。
    #[error("{0}")]
    FetchFailed(String),

    /// 图片字节损坏或格式不受支持。
    #[error("{0}")]
    DecodeFailed(String),

    /// GIF 实际尺寸与请求尺寸不一致（GIF 从不缩放）。
    #[error("wrong gif size: expected {expected} but got {actual}")]
    SizeMismatch {
        expected: super::Size,
        actual: super::Size,
    },

    /// 缩放器内部错误（缓冲构建、滤镜、重采样）。
    #[error("{0}")]
    ResizeFailed(String),

    /// 换算后的目标尺寸超出上限或像素内存预算。
    #[error("{0}")]
    ResourceLimit(String),

    /// 编码器内部错误。
    #[error("{0}")]
    EncodeFailed(String),

    /// 路径或尺寸参数不合法，发生在调用引擎之前。
    #[error("{0}")]
    BadRequestShape(String),
}

impl ResizeError {
    /// 稳定错误码，用于日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch_failed",
            Self::DecodeFailed(_) => "decode_failed",
            Self::SizeMismatch { .. } => "size_mismatch",
            Self::ResizeFailed(_) => "resize_failed",
            Self::ResourceLimit(_) => "resource_limit",
            Self::EncodeFailed(_) => "encode_failed",
            Self::BadRequestShape(_) => "bad_request_shape",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "load",
            Self::DecodeFailed(_) | Self::SizeMismatch { .. } => "decode",
            Self::ResizeFailed(_) | Self::ResourceLimit(_) => "resize",
            Self::EncodeFailed(_) => "encode",
            Self::BadRequestShape(_) => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resizer::Size;

    #[test]
    fn size_mismatch_message_names_expected_then_actual() {
        let err = ResizeError::SizeMismatch {
            expected: Size::new(64, 64),
            actual: Size::new(32, 48),
        };

        assert_eq!(err.to_string(), "wrong gif size: expected 64x64 but got 32x48");
        assert_eq!(err.code(), "size_mismatch");
        assert_eq!(err.stage(), "decode");
    }
}
