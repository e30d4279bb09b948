//! # 请求路径解析模块
//!
//! ## 设计思路
//!
//! 将 URL 路径解析为 `ResizeRequest`，在调用拉取与变换之前完成全部形状校验。
//! 支持的路径形式：
//!
//! ```text
//! /{key}                     原样透传
//! /{W}x{H}/{key}             缩放到 W×H
//! /{W}x/{key} 或 /x{H}/{key}  单轴约束，另一轴为 0
//! /exact/{...}               携带 exact 标记，其余同上
//! ```
//!
//! 查询参数 `freeze=true` 表示冻结 GIF 动画（首帧转 PNG）。

use super::{FitSpec, ResizeError, Size};

/// 解析后的请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeRequest {
    /// 单段路径：直接代理源站字节。
    Passthrough { key: String },
    /// 需要经过变换引擎的请求。
    Resize { key: String, fit: FitSpec },
}

/// 将路径与查询串解析为 `ResizeRequest`。
///
/// 任何形状错误、尺寸语法错误、超出 `max_size` 均返回 `BadRequestShape`。
///
/// # 示例
/// ```rust
/// use image_resizer::resizer::{ResizeRequest, Size, parse_request};
///
/// let max_size = Size::new(1000, 1000);
/// let request = parse_request("/exact/64x64/watchface.png", Some("freeze=true"), max_size)?;
/// let ResizeRequest::Resize { key, fit } = request else { unreachable!() };
/// assert_eq!(key, "watchface.png");
/// assert!(fit.exact && fit.freeze_animation);
/// # Ok::<(), image_resizer::resizer::ResizeError>(())
/// ```
pub fn parse_request(
    path: &str,
    query: Option<&str>,
    max_size: Size,
) -> Result<ResizeRequest, ResizeError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut components: Vec<&str> = trimmed.split('/').collect();

    if components.len() == 1 {
        let key = non_empty_key(components[0])?;
        return Ok(ResizeRequest::Passthrough { key });
    }

    let mut exact = false;
    if components[0] == "exact" {
        exact = true;
        components.remove(0);
    }

    let (size, key) = match components.as_slice() {
        [key] => (Size::default(), *key),
        [size_spec, key] => {
            let size = parse_size_spec(size_spec)?;
            if !size.fits_within(max_size) {
                return Err(ResizeError::BadRequestShape(format!(
                    "请求尺寸 {} 超过上限 {}",
                    size, max_size
                )));
            }
            (size, *key)
        }
        _ => {
            return Err(ResizeError::BadRequestShape(format!(
                "路径段数量不合法：{}",
                path
            )));
        }
    };

    Ok(ResizeRequest::Resize {
        key: non_empty_key(key)?,
        fit: FitSpec {
            size,
            exact,
            freeze_animation: freeze_requested(query),
        },
    })
}

/// 解析 `WxH` / `Wx` / `xH`，缺省轴视为 0。
fn parse_size_spec(spec: &str) -> Result<Size, ResizeError> {
    let parts: Vec<&str> = spec.split('x').collect();
    let [width, height] = parts.as_slice() else {
        return Err(ResizeError::BadRequestShape(format!(
            "尺寸格式错误：{:?}",
            spec
        )));
    };

    Ok(Size::new(parse_axis(width, spec)?, parse_axis(height, spec)?))
}

fn parse_axis(value: &str, spec: &str) -> Result<u32, ResizeError> {
    if value.is_empty() {
        return Ok(0);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResizeError::BadRequestShape(format!(
            "尺寸格式错误：{:?}",
            spec
        )));
    }
    value
        .parse::<u32>()
        .map_err(|_| ResizeError::BadRequestShape(format!("尺寸数值越界：{:?}", spec)))
}

fn non_empty_key(key: &str) -> Result<String, ResizeError> {
    if key.is_empty() {
        return Err(ResizeError::BadRequestShape("缺少图片 key".to_string()));
    }
    Ok(key.to_string())
}

fn freeze_requested(query: Option<&str>) -> bool {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(name, _)| *name == "freeze")
        .is_some_and(|(_, value)| value == "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: Size = Size::new(1000, 1000);

    fn resize(path: &str, query: Option<&str>) -> (String, FitSpec) {
        match parse_request(path, query, MAX).expect("parse failed") {
            ResizeRequest::Resize { key, fit } => (key, fit),
            other => panic!("expected resize request, got {:?}", other),
        }
    }

    #[test]
    fn single_component_is_passthrough() {
        assert_eq!(
            parse_request("/logo.png", None, MAX).expect("parse failed"),
            ResizeRequest::Passthrough {
                key: "logo.png".to_string()
            }
        );
    }

    #[test]
    fn sized_request_parses_both_axes() {
        let (key, fit) = resize("/144x168/abc123", None);

        assert_eq!(key, "abc123");
        assert_eq!(fit.size, Size::new(144, 168));
        assert!(!fit.exact);
        assert!(!fit.freeze_animation);
    }

    #[test]
    fn one_sided_specs_fill_zero() {
        assert_eq!(resize("/x200/k", None).1.size, Size::new(0, 200));
        assert_eq!(resize("/300x/k", None).1.size, Size::new(300, 0));
    }

    #[test]
    fn exact_prefix_sets_flag() {
        let (key, fit) = resize("/exact/10x20/k", None);

        assert_eq!(key, "k");
        assert!(fit.exact);
        assert_eq!(fit.size, Size::new(10, 20));
    }

    #[test]
    fn exact_with_bare_key_targets_zero_size() {
        let (key, fit) = resize("/exact/k", None);

        assert_eq!(key, "k");
        assert!(fit.exact);
        assert_eq!(fit.size, Size::default());
    }

    #[test]
    fn freeze_requires_literal_true() {
        assert!(resize("/64x64/k", Some("freeze=true")).1.freeze_animation);
        assert!(resize("/64x64/k", Some("a=1&freeze=true")).1.freeze_animation);
        assert!(!resize("/64x64/k", Some("freeze=1")).1.freeze_animation);
        assert!(!resize("/64x64/k", Some("freeze")).1.freeze_animation);
        assert!(!resize("/64x64/k", None).1.freeze_animation);
    }

    #[test]
    fn rejects_bad_shapes() {
        let bad = [
            "/a/b/c",
            "/exact/1x1/k/extra",
            "/64/k",
            "/1x2x3/k",
            "/-1x10/k",
            "/axb/k",
            "/10x10/",
            "/",
        ];

        for path in bad {
            assert!(
                matches!(parse_request(path, None, MAX), Err(ResizeError::BadRequestShape(_))),
                "expected rejection for {}",
                path
            );
        }
    }

    #[test]
    fn rejects_sizes_over_ceiling() {
        assert!(matches!(
            parse_request("/1001x10/k", None, MAX),
            Err(ResizeError::BadRequestShape(_))
        ));
        assert!(matches!(
            parse_request("/x1001/k", None, MAX),
            Err(ResizeError::BadRequestShape(_))
        ));
        assert!(parse_request("/1000x1000/k", None, MAX).is_ok());
    }
}
