//! # 源站拉取模块
//!
//! ## 设计思路
//!
//! 拉取阶段只做一件事：对 `base_url + key` 发起一次 GET，拿回完整字节与声明的 MIME。
//! 不重试、不做内容校验，是否能解码交给变换引擎判断。
//!
//! ## 实现思路
//!
//! - 仅 HTTP 200 视为成功，其余状态码携带状态行报错。
//! - 响应体整体读入内存（`bytes::Bytes`），快速路径可零拷贝交还。
//! - `Content-Type` 原样返回，缺失时为空串。
//! - reqwest 错误统一映射为 `ResizeError::FetchFailed`，日志中的 URL 去除查询串。

use bytes::Bytes;

use super::{ImageBlob, ImageResizer, ResizeError, ResizerConfig};

impl ImageResizer {
    /// 从源站拉取图片原始字节。
    pub(super) async fn fetch_image_bytes(&self, url: &str) -> Result<ImageBlob, ResizeError> {
        log::debug!("🌐 拉取源站图片 - URL: {}", redact_url_for_log(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, url))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ResizeError::FetchFailed(format!(
                "couldn't fetch asset: {} ({})",
                status,
                status.as_u16()
            )));
        }

        let declared_mimetype = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| ResizeError::FetchFailed(format!("读取响应体失败：{}", sanitize(&e, url))))?;

        log::debug!(
            "✅ 拉取完成 - {} bytes, content-type={:?}",
            bytes.len(),
            declared_mimetype
        );

        Ok(ImageBlob {
            declared_mimetype,
            bytes,
        })
    }
}

/// 构建复用型 HTTP 客户端。
///
/// 超时仅在配置非 0 时设置，否则沿用传输层默认行为。
pub(super) fn build_http_client(config: &ResizerConfig) -> Result<reqwest::Client, ResizeError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.fetch_timeout() {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ResizeError::FetchFailed(format!("无法创建 HTTP 客户端：{}", e)))
}

/// 统一映射 reqwest 错误到业务错误。
fn map_reqwest_error(e: reqwest::Error, url: &str) -> ResizeError {
    let err_msg = sanitize(&e, url);

    if e.is_timeout() {
        ResizeError::FetchFailed(format!("拉取超时：{}", err_msg))
    } else if e.is_connect() {
        ResizeError::FetchFailed(format!("无法连接：{}", err_msg))
    } else {
        ResizeError::FetchFailed(format!("请求失败：{}", err_msg))
    }
}

fn sanitize(e: &reqwest::Error, url: &str) -> String {
    e.to_string().replace(url, &redact_url_for_log(url))
}

/// 日志用 URL：去掉查询串与片段，避免签名参数落盘。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// 单次应答的本地源站：读取请求后写回 `head` 与 `body`。
    fn serve_once(head: String, body: Vec<u8>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept failed");

            let mut req_buf = [0u8; 1024];
            let _ = stream.read(&mut req_buf);

            stream.write_all(head.as_bytes()).expect("write headers failed");
            stream.write_all(&body).expect("write body failed");
            stream.flush().expect("flush failed");
        });

        (format!("http://127.0.0.1:{}/", addr.port()), server)
    }

    fn resizer() -> ImageResizer {
        ImageResizer::new(ResizerConfig {
            base_url: "http://127.0.0.1/".to_string(),
            ..ResizerConfig::default()
        })
        .expect("resizer init failed")
    }

    #[tokio::test]
    async fn fetch_returns_body_and_declared_content_type() {
        let body = b"not really a png".to_vec();
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png; charset=binary\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let (base, server) = serve_once(head, body.clone());

        let blob = resizer()
            .fetch_image_bytes(&format!("{}asset.png", base))
            .await
            .expect("fetch should succeed");

        server.join().expect("server thread failed");

        assert_eq!(blob.declared_mimetype, "image/png; charset=binary");
        assert_eq!(&blob.bytes[..], &body[..]);
    }

    #[tokio::test]
    async fn fetch_without_content_type_yields_empty_mimetype() {
        let head = "HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\n".to_string();
        let (base, server) = serve_once(head, b"abc".to_vec());

        let blob = resizer()
            .fetch_image_bytes(&format!("{}k", base))
            .await
            .expect("fetch should succeed");

        server.join().expect("server thread failed");

        assert_eq!(blob.declared_mimetype, "");
    }

    #[tokio::test]
    async fn fetch_rejects_non_200_status() {
        let head =
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
        let (base, server) = serve_once(head, Vec::new());

        let result = resizer().fetch_image_bytes(&format!("{}missing", base)).await;

        server.join().expect("server thread failed");

        match result {
            Err(ResizeError::FetchFailed(msg)) => assert!(msg.contains("(404)"), "{}", msg),
            other => panic!("expected fetch failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_treats_other_success_codes_as_failure() {
        let head =
            "HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
        let (base, server) = serve_once(head, Vec::new());

        let result = resizer().fetch_image_bytes(&format!("{}empty", base)).await;

        server.join().expect("server thread failed");

        assert!(matches!(result, Err(ResizeError::FetchFailed(_))));
    }

    #[tokio::test]
    async fn fetch_reports_connection_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
        let port = listener.local_addr().expect("read local addr failed").port();
        drop(listener);

        let result = resizer()
            .fetch_image_bytes(&format!("http://127.0.0.1:{}/gone.png", port))
            .await;

        assert!(matches!(result, Err(ResizeError::FetchFailed(_))));
    }

    #[test]
    fn redact_url_for_log_removes_query_and_fragment() {
        let redacted =
            redact_url_for_log("https://example.com:8443/path/img.png?token=abc123#hash");

        assert_eq!(redacted, "https://example.com:8443/path/img.png");
    }

    #[test]
    fn build_http_client_accepts_timeouts() {
        let config = ResizerConfig {
            connect_timeout_secs: 3,
            fetch_timeout_secs: 10,
            ..ResizerConfig::default()
        };

        assert!(build_http_client(&config).is_ok());
    }
}
