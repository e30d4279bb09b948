//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 变换引擎是一个纯函数：输入（字节、源站声明 MIME、`FitSpec`），输出（字节、真实 MIME）。
//! 不持有任何跨请求状态，唯一的“复用”是尺寸已匹配时直接交还拉取到的字节。
//!
//! ## 实现思路
//!
//! 1. 以 `GIF8` 魔数分流：GIF 从不缩放，只校验尺寸；可选冻结为首帧 PNG
//! 2. 其他格式交给通用解码器，同时拿到识别出的格式标签
//! 3. 尺寸一致时走快速路径，原样返回字节与声明 MIME
//! 4. 否则按零轴规则换算目标尺寸；换算结果超出尺寸上限或像素预算时拒绝，
//!    在分配目标缓冲之前失败
//! 5. Lanczos2 重采样，缩放器出错直接返回错误，不换滤镜重试
//! 6. 按识别格式重新编码：jpeg → JPEG(80)，png 与其他 → PNG

use std::f64::consts::PI;
use std::io::Cursor;
use std::time::Instant;

use bytes::Bytes;
use fast_image_resize as fr;
use image::codecs::gif::GifDecoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageDecoder, ImageReader, Rgba};

use super::{DetectedFormat, FitSpec, ImageBlob, ResizeError, ResizedImage, Size};

const GIF_MAGIC: &[u8] = b"GIF8";
const JPEG_QUALITY: u8 = 80;
const LANCZOS2_SUPPORT: f64 = 2.0;
/// 重采样缓冲按 RGBA8 计算。
const BYTES_PER_PIXEL: u64 = 4;

pub const MIME_GIF: &str = "image/gif";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

/// 按 `FitSpec` 变换图片。
///
/// `fit.exact` 不参与计算：缩放目标始终是 `fit.size` 的字面值（零轴按比例换算）。
/// `max_size` 约束零轴换算出的目标尺寸，超出时返回 `ResourceLimit`。
///
/// # 示例
/// ```rust,ignore
/// use image_resizer::resizer::{FitSpec, ImageBlob, Size, resize_to_fit};
///
/// let fit = FitSpec { size: Size::new(250, 250), ..FitSpec::default() };
/// let resized = resize_to_fit(blob, fit, Size::new(1000, 1000))?;
/// assert_eq!(resized.mimetype, "image/jpeg");
/// ```
pub fn resize_to_fit(
    blob: ImageBlob,
    fit: FitSpec,
    max_size: Size,
) -> Result<ResizedImage, ResizeError> {
    if blob.bytes.starts_with(GIF_MAGIC) {
        return gif_to_fit(blob, fit);
    }
    raster_to_fit(blob, fit, max_size)
}

/// GIF 分支：解码首帧，尺寸必须与请求完全一致。
fn gif_to_fit(blob: ImageBlob, fit: FitSpec) -> Result<ResizedImage, ResizeError> {
    let decoder = GifDecoder::new(Cursor::new(&blob.bytes[..]))
        .map_err(|e| ResizeError::DecodeFailed(format!("failed to decode gif: {}", e)))?;
    let (width, height) = decoder.dimensions();
    let first_frame = DynamicImage::from_decoder(decoder)
        .map_err(|e| ResizeError::DecodeFailed(format!("failed to decode gif: {}", e)))?;

    let actual = Size::new(width, height);
    if actual != fit.size {
        return Err(ResizeError::SizeMismatch {
            expected: fit.size,
            actual,
        });
    }

    if !fit.freeze_animation {
        return Ok(ResizedImage {
            mimetype: MIME_GIF.to_string(),
            bytes: blob.bytes,
        });
    }

    log::debug!("🧊 冻结 GIF 动画：{} 首帧转 PNG", actual);
    let png = encode_png(&first_frame)
        .map_err(|e| ResizeError::EncodeFailed(format!("failed to encode gif as png: {}", e)))?;

    Ok(ResizedImage {
        mimetype: MIME_PNG.to_string(),
        bytes: Bytes::from(png),
    })
}

/// 通用栅格分支：解码 → 快速路径或缩放 → 重新编码。
fn raster_to_fit(
    blob: ImageBlob,
    fit: FitSpec,
    max_size: Size,
) -> Result<ResizedImage, ResizeError> {
    let decode_start = Instant::now();
    let reader = ImageReader::new(Cursor::new(&blob.bytes[..]))
        .with_guessed_format()
        .map_err(|e| ResizeError::DecodeFailed(format!("failed to decode image: {}", e)))?;
    let format = reader.format().map(DetectedFormat::from).ok_or_else(|| {
        ResizeError::DecodeFailed("failed to decode image: unknown format".to_string())
    })?;
    let decoded = reader
        .decode()
        .map_err(|e| ResizeError::DecodeFailed(format!("failed to decode image: {}", e)))?;
    let decode_elapsed = decode_start.elapsed();

    let (source_width, source_height) = decoded.dimensions();
    let source = Size::new(source_width, source_height);
    if source == fit.size {
        log::debug!(
            "⚡ 尺寸已匹配，跳过变换 - format={} size={}",
            format.as_str(),
            source
        );
        return Ok(ResizedImage {
            mimetype: blob.declared_mimetype,
            bytes: blob.bytes,
        });
    }

    let resize_start = Instant::now();
    let target = target_dimensions(source, fit.size);
    let resized = if target == source {
        decoded
    } else {
        validate_target(target, max_size)?;
        resize_lanczos2(decoded, target)?
    };
    let resize_elapsed = resize_start.elapsed();

    let encode_start = Instant::now();
    let output = encode_for_format(&resized, format)?;
    let encode_elapsed = encode_start.elapsed();

    log::debug!(
        "🧩 变换完成 - format={} {} -> {} (exact={}) decode={}ms resize={}ms encode={}ms",
        format.as_str(),
        source,
        target,
        fit.exact,
        decode_elapsed.as_millis(),
        resize_elapsed.as_millis(),
        encode_elapsed.as_millis()
    );

    Ok(output)
}

/// 换算实际缩放目标。
///
/// - 两轴都为 0：保持原尺寸
/// - 单轴为 0：按另一轴的缩放比例等比换算（`floor(0.7 + 原长 / 比例)`）
/// - 两轴都非 0：字面值，不保持宽高比
///
/// 换算结果至少为 1 像素。
pub(crate) fn target_dimensions(source: Size, requested: Size) -> Size {
    let source_width = source.width as f64;
    let source_height = source.height as f64;

    let (scale_x, scale_y) = match (requested.width, requested.height) {
        (0, 0) => (1.0, 1.0),
        (0, height) => {
            let scale = source_height / height as f64;
            (scale, scale)
        }
        (width, 0) => {
            let scale = source_width / width as f64;
            (scale, scale)
        }
        (width, height) => (source_width / width as f64, source_height / height as f64),
    };

    let width = match requested.width {
        0 => (0.7 + source_width / scale_x) as u32,
        width => width,
    };
    let height = match requested.height {
        0 => (0.7 + source_height / scale_y) as u32,
        height => height,
    };

    Size::new(width.max(1), height.max(1))
}

/// 校验换算后的目标尺寸：不超过 `max_size`，且 RGBA 缓冲字节数可寻址。
///
/// 字面值两轴已在请求解析阶段受上限约束，这里拦截的是零轴换算放大的结果
/// （例如 1x2000 的源图请求 `1000x`，换算高度为 2000000）。
fn validate_target(target: Size, max_size: Size) -> Result<(), ResizeError> {
    if !target.fits_within(max_size) {
        log::warn!("🚫 换算目标 {} 超出尺寸上限 {}", target, max_size);
        return Err(ResizeError::ResourceLimit(format!(
            "computed size {} exceeds the maximum of {}",
            target, max_size
        )));
    }

    let buffer_bytes = (target.width as u64)
        .checked_mul(target.height as u64)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .and_then(|bytes| usize::try_from(bytes).ok());
    match buffer_bytes {
        Some(_) => Ok(()),
        None => Err(ResizeError::ResourceLimit(format!(
            "computed size {} needs more memory than addressable",
            target
        ))),
    }
}

fn resize_lanczos2(image: DynamicImage, target: Size) -> Result<DynamicImage, ResizeError> {
    let has_alpha = image.color().has_alpha();

    let resized = resize_with_fast_image_resize(&image, target)?;

    if has_alpha {
        Ok(resized)
    } else {
        Ok(DynamicImage::ImageRgb8(resized.to_rgb8()))
    }
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target: Size,
) -> Result<DynamicImage, ResizeError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();
    let src_image = rgba_source_image(src_width, src_height, src.into_raw())?;

    let mut dst_image = fr::images::Image::new(target.width, target.height, fr::PixelType::U8x4);

    let filter = fr::Filter::new("Lanczos2", lanczos2_kernel, LANCZOS2_SUPPORT)
        .map_err(|e| ResizeError::ResizeFailed(format!("Lanczos2 滤镜构建失败：{:?}", e)))?;
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Custom(filter)));

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ResizeError::ResizeFailed(format!("fast_image_resize 执行失败：{}", e)))?;

    let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
        target.width,
        target.height,
        dst_image.into_vec(),
    )
    .ok_or_else(|| ResizeError::ResizeFailed("fast_image_resize 输出缓冲长度异常".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

fn rgba_source_image(
    width: u32,
    height: u32,
    raw: Vec<u8>,
) -> Result<fr::images::Image<'static>, ResizeError> {
    fr::images::Image::from_vec_u8(width, height, raw, fr::PixelType::U8x4)
        .map_err(|e| ResizeError::ResizeFailed(format!("构建源图像缓冲失败：{}", e)))
}

/// 2 瓣 Lanczos 核：`sinc(x) * sinc(x / 2)`，|x| ≥ 2 时为 0。
fn lanczos2_kernel(x: f64) -> f64 {
    if x.abs() >= LANCZOS2_SUPPORT {
        return 0.0;
    }
    sinc(x) * sinc(x / LANCZOS2_SUPPORT)
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        return 1.0;
    }
    let a = x * PI;
    a.sin() / a
}

fn encode_for_format(
    image: &DynamicImage,
    format: DetectedFormat,
) -> Result<ResizedImage, ResizeError> {
    let (mimetype, bytes) = match format {
        DetectedFormat::Jpeg => {
            let jpeg = encode_jpeg(image)
                .map_err(|e| ResizeError::EncodeFailed(format!("failed to encode jpeg: {}", e)))?;
            (MIME_JPEG, jpeg)
        }
        DetectedFormat::Png => (MIME_PNG, encode_png_or_fail(image)?),
        other => {
            log::warn!("⚠️ 未知图片格式 {:?}，回退为 PNG 输出", other.as_str());
            (MIME_PNG, encode_png_or_fail(image)?)
        }
    };

    Ok(ResizedImage {
        mimetype: mimetype.to_string(),
        bytes: Bytes::from(bytes),
    })
}

fn encode_png_or_fail(image: &DynamicImage) -> Result<Vec<u8>, ResizeError> {
    encode_png(image).map_err(|e| ResizeError::EncodeFailed(format!("failed to encode png: {}", e)))
}

fn encode_jpeg(image: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_png(image: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_with_encoder(PngEncoder::new(&mut buf))?;
    Ok(buf)
}
