// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::{debug, warn};

/// 在文档头部查找 `<meta charset>` 声明的范围
const META_SNIFF_LIMIT: usize = 2048;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-]+)"#)
        .expect("meta charset pattern is valid")
});

/// 编码检测来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    /// 来自 Content-Type 响应头
    Header,
    /// 来自文档内的 meta 标签
    Meta,
    /// 由 chardetng 猜测
    Detected,
}

/// 编码检测结果
#[derive(Debug, Clone)]
pub struct EncodingDetection {
    pub encoding: &'static Encoding,
    pub source: EncodingSource,
}

/// 推断 HTML 字节流的字符编码
///
/// 优先级：响应头 charset > meta 标签 > chardetng 猜测
pub fn detect_encoding(input: &[u8], content_type: Option<&str>) -> EncodingDetection {
    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        return EncodingDetection {
            encoding,
            source: EncodingSource::Header,
        };
    }

    let head = &input[..input.len().min(META_SNIFF_LIMIT)];
    if let Some(encoding) = META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return EncodingDetection {
            encoding,
            source: EncodingSource::Meta,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(input, true);
    EncodingDetection {
        encoding: detector.guess(None, true),
        source: EncodingSource::Detected,
    }
}

/// 将响应体解码为 UTF-8 字符串
///
/// 旧式中文站点大量使用 GBK，且经常不在响应头里声明编码
pub fn decode_html(input: &[u8], content_type: Option<&str>) -> String {
    let detection = detect_encoding(input, content_type);
    debug!(
        "检测到编码: {} ({:?})",
        detection.encoding.name(),
        detection.source
    );

    let (decoded, actual, had_errors) = detection.encoding.decode(input);
    if had_errors {
        warn!(
            "按 {} 解码时存在无法识别的字节，已使用替换字符",
            actual.name()
        );
    }
    decoded.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
        .map(|encoding| {
            // encoding_rs 把 utf-16 标签映射到 UTF-16LE，HTML 场景按 UTF-8 处理更稳妥
            if encoding.name().starts_with("UTF-16") {
                UTF_8
            } else {
                encoding
            }
        })
}
