// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Map, Value};
use url::Url;

use crate::domain::models::parse_rule::{ParseRule, ParseRules, Processor};
use crate::domain::models::record::Record;

// Elements that start on a new line when rendered, used to approximate innerText.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tr", "ul",
];

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "noscript", "head"];

/// 抽取过程中的单个值
enum Cell<'a> {
    Node(ElementRef<'a>),
    Data(Value),
}

/// 字段的当前值
enum Running<'a> {
    Many(Vec<Cell<'a>>),
    One(Cell<'a>),
    Nothing,
}

/// 抽取服务
///
/// 在页面快照上解释 `[selector, ...processors]` 规则。
/// 返回值只包含 JSON 数据，`Html` 与节点引用都不会离开本模块
pub struct ExtractionService;

impl ExtractionService {
    /// 按规则抽取字段
    ///
    /// # 参数
    ///
    /// * `html_content` - 页面快照
    /// * `page_url` - 页面地址，用于把相对链接转换为绝对地址
    /// * `rules` - 字段抽取规则
    pub fn extract(html_content: &str, page_url: &str, rules: &ParseRules) -> Record {
        let document = Html::parse_document(html_content);
        let base = Url::parse(page_url).ok();

        let mut record = Record::new();
        for (field, rule) in rules.iter() {
            record.insert(field.clone(), Self::apply_rule(&document, base.as_ref(), rule));
        }
        record
    }

    /// 选出匹配节点的属性列表
    ///
    /// `href`/`src` 返回绝对地址，`innerText`/`text` 返回渲染文本，
    /// `textContent`、`innerHTML`、`outerHTML` 与 DOM 属性含义一致，
    /// 其他名称读取同名 HTML 属性，缺失时为 `null`
    pub fn select_attributes(
        html_content: &str,
        page_url: &str,
        selector: &Selector,
        attrs: &[&str],
    ) -> Vec<Map<String, Value>> {
        let document = Html::parse_document(html_content);
        let base = Url::parse(page_url).ok();

        document
            .select(selector)
            .map(|element| {
                attrs
                    .iter()
                    .map(|attr| (attr.to_string(), node_property(element, base.as_ref(), attr)))
                    .collect()
            })
            .collect()
    }

    fn apply_rule(document: &Html, base: Option<&Url>, rule: &ParseRule) -> Value {
        let mut value = Running::Many(document.select(rule.selector()).map(Cell::Node).collect());

        for processor in rule.processors() {
            value = match value {
                // Nothing left to transform; later processors are skipped.
                Running::Nothing => break,
                Running::Many(cells) => match processor {
                    Processor::Single => cells
                        .into_iter()
                        .next()
                        .map_or(Running::Nothing, Running::One),
                    _ => Running::Many(
                        cells
                            .into_iter()
                            .map(|cell| map_cell(cell, *processor, base))
                            .collect(),
                    ),
                },
                Running::One(cell) => match processor {
                    Processor::Single => Running::One(cell),
                    _ => Running::One(map_cell(cell, *processor, base)),
                },
            };
        }

        match value {
            Running::Many(cells) => Value::Array(cells.into_iter().map(into_value).collect()),
            Running::One(cell) => into_value(cell),
            Running::Nothing => Value::Null,
        }
    }
}

fn map_cell<'a>(cell: Cell<'a>, processor: Processor, base: Option<&Url>) -> Cell<'a> {
    match (processor, cell) {
        (Processor::Text, Cell::Node(node)) => Cell::Data(Value::String(rendered_text(node))),
        (Processor::Trim, Cell::Node(node)) => {
            Cell::Data(Value::String(rendered_text(node).trim().to_string()))
        }
        (Processor::Trim, Cell::Data(Value::String(s))) => {
            Cell::Data(Value::String(s.trim().to_string()))
        }
        (Processor::Anchor, Cell::Node(node)) => Cell::Data(json!({
            "text": rendered_text(node).trim(),
            "href": resolved_attr(node, base, "href"),
        })),
        (Processor::AnchorPair, Cell::Node(node)) => Cell::Data(json!([
            rendered_text(node).trim(),
            resolved_attr(node, base, "href"),
        ])),
        (Processor::Image, Cell::Node(node)) => Cell::Data(json!({
            "src": resolved_attr(node, base, "src"),
            "title": node.value().attr("title").unwrap_or_default(),
        })),
        // Processor does not apply to this kind of value; pass it through.
        (_, cell) => cell,
    }
}

fn into_value(cell: Cell<'_>) -> Value {
    match cell {
        Cell::Node(node) => Value::String(rendered_text(node)),
        Cell::Data(value) => value,
    }
}

fn node_property(element: ElementRef<'_>, base: Option<&Url>, name: &str) -> Value {
    match name {
        "href" | "src" => element
            .value()
            .attr(name)
            .map_or(Value::Null, |_| Value::String(resolved_attr(element, base, name))),
        "innerText" | "text" => Value::String(rendered_text(element)),
        "textContent" => Value::String(element.text().collect()),
        "innerHTML" => Value::String(element.inner_html()),
        "outerHTML" => Value::String(element.html()),
        "className" => element
            .value()
            .attr("class")
            .map_or(Value::Null, |v| Value::String(v.to_string())),
        other => element
            .value()
            .attr(other)
            .map_or(Value::Null, |v| Value::String(v.to_string())),
    }
}

/// 属性值，相对地址按页面地址解析；属性缺失时为空串
fn resolved_attr(element: ElementRef<'_>, base: Option<&Url>, name: &str) -> String {
    let raw = element.value().attr(name).unwrap_or_default().trim();
    if raw.is_empty() {
        return String::new();
    }
    base.and_then(|b| b.join(raw).ok())
        .map(String::from)
        .unwrap_or_else(|| raw.to_string())
}

/// 近似浏览器的 innerText：折叠源码空白，`<br>` 和块级元素产生换行
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_rendered(element, &mut out);
    out.trim_end_matches(['\n', ' ']).to_string()
}

fn push_rendered(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_collapsed(text, out);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if name == "br" {
                push_newline(out);
                continue;
            }
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let breaks = if name == "p" {
                2
            } else if BLOCK_ELEMENTS.contains(&name) {
                1
            } else {
                0
            };
            push_breaks(out, breaks);
            push_rendered(child_el, out);
            push_breaks(out, breaks);
        }
    }
}

fn push_collapsed(text: &str, out: &mut String) {
    for c in text.chars() {
        if matches!(c, ' ' | '\n' | '\t' | '\r' | '\x0c') {
            if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

/// 补足结尾换行到 `count` 个，与相邻块的换行合并而不叠加
fn push_breaks(out: &mut String, count: usize) {
    if count == 0 || out.is_empty() {
        return;
    }
    while out.ends_with(' ') {
        out.pop();
    }
    let present = out.len() - out.trim_end_matches('\n').len();
    for _ in present..count {
        out.push('\n');
    }
}

fn push_newline(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
