// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 章节渲染用的标准后处理器
//!
//! 签名与 [`PostProcessor`](super::aggregation_service::PostProcessor) 一致，
//! 可直接传给 `AggregationSpec::with_post_processor`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::chapter::{ChapterHeader, ChapterInfo, Toc};

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\x{3000}]*\n\s*").unwrap());

const PAGE_STYLE: &str = r#"body { max-width: 42em; margin: 0 auto; padding: 1em; line-height: 1.8; font-size: 1.1em; }
h2 { text-align: center; }
nav { display: flex; justify-content: space-between; margin: 2em 0; }
a { color: #2a5db0; text-decoration: none; }"#;

/// 在章节索引中定位当前章节并写入目录指针，内容不变
pub fn generate_toc(content: String, chapter: &mut ChapterInfo, index: &[ChapterHeader]) -> String {
    if let Some(position) = index.iter().position(|h| h.file_name == chapter.file_name) {
        chapter.toc = Some(Toc {
            current_index: position,
            num_chapter: index.len(),
            prev: position.checked_sub(1).and_then(|i| index.get(i)).cloned(),
            next: index.get(position + 1).cloned(),
        });
    }
    content
}

/// 纯文本转为 HTML 片段
///
/// 空行分隔的每一段生成一个 `<p>`，段内换行变为 `<br />`，
/// 开头加上章节标题 `<h2>`。结果同时保存在 `chapter.html_content`
pub fn htmlize(content: String, chapter: &mut ChapterInfo, _index: &[ChapterHeader]) -> String {
    let mut html = format!("<h2>{}</h2>\n", html_escape::encode_text(&chapter.chapter_name));

    for block in BLANK_LINES.split(content.trim()) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let lines: Vec<String> = block
            .lines()
            .map(|line| html_escape::encode_text(line.trim()).into_owned())
            .collect();
        html.push_str("<p>");
        html.push_str(&lines.join("<br />\n"));
        html.push_str("</p>\n");
    }

    chapter.html_content = Some(html.clone());
    html
}

/// 生成完整的章节页面，左右方向键切换上一章/下一章
pub fn build_html_page(content: String, chapter: &mut ChapterInfo, _index: &[ChapterHeader]) -> String {
    let prev = chapter.toc.as_ref().and_then(|toc| toc.prev.as_ref());
    let next = chapter.toc.as_ref().and_then(|toc| toc.next.as_ref());
    let prev_file = prev.map(|h| h.file_name.as_str()).unwrap_or_default();
    let next_file = next.map(|h| h.file_name.as_str()).unwrap_or_default();

    let mut nav = String::from("<nav>");
    match prev {
        Some(h) => nav.push_str(&format!(
            "<a class=\"prev\" href=\"{}\">&larr; {}</a>",
            html_escape::encode_double_quoted_attribute(&h.file_name),
            html_escape::encode_text(&h.chapter_name)
        )),
        None => nav.push_str("<span></span>"),
    }
    match next {
        Some(h) => nav.push_str(&format!(
            "<a class=\"next\" href=\"{}\">{} &rarr;</a>",
            html_escape::encode_double_quoted_attribute(&h.file_name),
            html_escape::encode_text(&h.chapter_name)
        )),
        None => nav.push_str("<span></span>"),
    }
    nav.push_str("</nav>");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title}</title>
<style>
{style}
</style>
<script>
var prevFileName='{prev}';
var nextFileName='{next}';
document.addEventListener('keydown', function (e) {{
    if (e.key === 'ArrowLeft' && prevFileName) {{ window.location.href = prevFileName; }}
    if (e.key === 'ArrowRight' && nextFileName) {{ window.location.href = nextFileName; }}
}});
</script>
</head>
<body>
{nav}
{content}
{nav}
</body>
</html>
"#,
        title = html_escape::encode_text(&chapter.chapter_name),
        style = PAGE_STYLE,
        prev = js_string(prev_file),
        next = js_string(next_file),
        nav = nav,
        content = content,
    )
}

/// 拼接全部章节的 `html_content`，供 `cleanup` 生成整书
pub fn stitch_html(chapters: &[ChapterInfo]) -> String {
    chapters
        .iter()
        .filter_map(|chapter| chapter.html_content.as_deref())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn js_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('<', "\\x3c")
}
