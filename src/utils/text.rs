// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 站点配置常用的文本整理函数

/// 左侧补零到指定宽度，超长时原样返回
pub fn add_leading_zero(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// 将章节名之类的任意文本转换为可用的文件名
pub fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// 按数字大小比较两个 id
///
/// `"1_10"` 按 `[1, 10]` 逐段比较，因此排在 `"1_9"` 之后。
/// 可解析的 id 一律排在不可解析的之前，后者按字符串比较
pub fn numeric_less(a: &str, b: &str) -> bool {
    ordinal_key(a) < ordinal_key(b)
}

fn ordinal_key(id: &str) -> (bool, Option<Vec<u64>>, &str) {
    let parsed = parse_ordinal(id);
    (parsed.is_none(), parsed, id)
}

fn parse_ordinal(id: &str) -> Option<Vec<u64>> {
    id.split('_').map(|part| part.trim().parse::<u64>().ok()).collect()
}
