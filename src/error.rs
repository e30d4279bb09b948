//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError`，承接缩放链路、配置校验与 I/O 三类错误来源。
//! HTTP 边界层只与 `AppError` 打交道，由它决定状态码与响应体。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ResizeError` / `ConfigError` 提供 `From` 转换，无需手动 map。
//! - 实现 axum `IntoResponse`：按错误分支选择状态码，响应体为纯文本错误消息。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::resizer::{ConfigError, ResizeError};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 缩放链路错误（拉取 / 解码 / 尺寸 / 编码 / 请求形状）
    #[error("{0}")]
    Resize(#[from] ResizeError),

    /// 透传请求的源站拉取失败，对外表现为 404
    #[error("{0}")]
    NotFound(ResizeError),

    /// 启动配置不合法
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 监听 / 服务 I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 错误对应的 HTTP 状态码。
    ///
    /// - 请求形状错误、透传拉取失败：404
    /// - 拉取 / 解码 / GIF 尺寸不符 / 目标尺寸超限：400
    /// - 缩放、编码失败及其他服务端错误：500
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Resize(err) => match err {
                ResizeError::BadRequestShape(_) => StatusCode::NOT_FOUND,
                ResizeError::FetchFailed(_)
                | ResizeError::DecodeFailed(_)
                | ResizeError::SizeMismatch { .. }
                | ResizeError::ResourceLimit(_) => StatusCode::BAD_REQUEST,
                ResizeError::ResizeFailed(_) | ResizeError::EncodeFailed(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Resize(err) | Self::NotFound(err) => log::info!(
                "请求失败 status={} code={} stage={}: {}",
                status.as_u16(),
                err.code(),
                err.stage(),
                err
            ),
            _ => log::error!("请求失败 status={}: {}", status.as_u16(), self),
        }

        let body = match status {
            StatusCode::NOT_FOUND => "404 page not found".to_string(),
            _ => self.to_string(),
        };
        (status, body).into_response()
    }
}
