//! # HTTP 服务层
//!
//! ## 设计思路
//!
//! 服务层仅做 HTTP 入参/出参适配，不承载业务逻辑：
//! 路径解析交给 `resizer::parse_request`，实际处理交给 `ImageResizer`。
//!
//! ## 实现思路
//!
//! - `/healthz` 固定返回服务名。
//! - 其余路径统一进入 `handle_image`，成功时写入长缓存响应头。
//! - 错误统一转为 `AppError`，由其 `IntoResponse` 选择状态码。

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bytes::Bytes;

use crate::error::AppError;
use crate::resizer::{ImageResizer, ResizeRequest, parse_request};

pub const HEALTH_BODY: &str = "image-resizer";
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=2592000";

/// 构建路由。
pub fn router(resizer: Arc<ImageResizer>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(handle_image)
        .with_state(resizer)
}

/// 绑定地址并提供服务，直到收到 Ctrl-C。
pub async fn serve(resizer: Arc<ImageResizer>) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(resizer.config().listen.as_str()).await?;
    log::info!("🚀 开始监听 {}", listener.local_addr()?);

    axum::serve(listener, router(resizer))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("监听退出信号失败: {err}");
        std::future::pending::<()>().await;
    }
}

async fn healthz() -> &'static str {
    HEALTH_BODY
}

async fn handle_image(
    State(resizer): State<Arc<ImageResizer>>,
    uri: Uri,
) -> Result<Response, AppError> {
    let request = parse_request(uri.path(), uri.query(), resizer.config().max_size)?;
    log::debug!("收到请求 {:?}", request);

    match request {
        ResizeRequest::Passthrough { key } => {
            let blob = resizer.passthrough(&key).await.map_err(AppError::NotFound)?;
            Ok(image_response(&blob.declared_mimetype, blob.bytes))
        }
        ResizeRequest::Resize { key, fit } => {
            let resized = resizer.resize(&key, fit).await?;
            Ok(image_response(&resized.mimetype, resized.bytes))
        }
    }
}

/// 写入内容类型、长缓存与长度头。
fn image_response(mimetype: &str, body: Bytes) -> Response {
    let content_type = HeaderValue::from_str(mimetype)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let content_length = HeaderValue::from(body.len());

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE)),
            (header::CONTENT_LENGTH, content_length),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn image_response_sets_caching_headers() {
        let response = image_response("image/png", Bytes::from_static(b"abcd"));

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CACHE_CONTROL], CACHE_CONTROL_VALUE);
        assert_eq!(headers[header::CONTENT_LENGTH], "4");

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body failed");
        assert_eq!(&body[..], b"abcd");
    }

    #[test]
    fn empty_declared_mimetype_is_sent_as_is() {
        let response = image_response("", Bytes::new());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "");
    }
}
