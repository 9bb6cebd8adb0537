// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Selector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 抽取规则定义错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRuleError {
    #[error("规则 {field} 缺少选择器")]
    MissingSelector { field: String },

    #[error("无效的选择器 {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("未知的处理器: {0}")]
    UnknownProcessor(String),
}

/// 抽取处理器，按声明顺序从左到右作用于当前值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processor {
    /// 取第一个元素
    Single,
    /// 节点 → 渲染文本
    Text,
    /// 字符串 → 去除首尾空白
    Trim,
    /// 链接节点 → `{text, href}`
    Anchor,
    /// 图片节点 → `{src, title}`
    Image,
    /// 旧配置使用的链接格式 → `[text, href]`
    AnchorPair,
}

impl FromStr for Processor {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Processor::Single),
            "op:text" | "text" => Ok(Processor::Text),
            "op:trim" | "trim" => Ok(Processor::Trim),
            "el:a" => Ok(Processor::Anchor),
            "el:img" => Ok(Processor::Image),
            "ahref" => Ok(Processor::AnchorPair),
            other => Err(ParseRuleError::UnknownProcessor(other.to_string())),
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Processor::Single => "single",
            Processor::Text => "op:text",
            Processor::Trim => "op:trim",
            Processor::Anchor => "el:a",
            Processor::Image => "el:img",
            Processor::AnchorPair => "ahref",
        };
        f.write_str(name)
    }
}

/// 单个字段的抽取规则 `[selector, ...processors]`
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct ParseRule {
    source: String,
    selector: Selector,
    processors: Vec<Processor>,
}

impl ParseRule {
    pub fn new(selector: &str, processors: &[&str]) -> Result<Self, ParseRuleError> {
        let compiled = Selector::parse(selector).map_err(|e| ParseRuleError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        let processors = processors
            .iter()
            .map(|p| p.parse())
            .collect::<Result<Vec<Processor>, _>>()?;

        Ok(Self {
            source: selector.to_string(),
            selector: compiled,
            processors,
        })
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn selector_source(&self) -> &str {
        &self.source
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }
}

impl TryFrom<Vec<String>> for ParseRule {
    type Error = ParseRuleError;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        let (selector, processors) = parts
            .split_first()
            .ok_or_else(|| ParseRuleError::MissingSelector {
                field: String::new(),
            })?;
        let processors: Vec<&str> = processors.iter().map(String::as_str).collect();
        Self::new(selector, &processors)
    }
}

/// 字段名 → 抽取规则
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ParseRules(BTreeMap<String, ParseRule>);

impl ParseRules {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 以 `[(field, [selector, processors...])]` 的形式批量构造
    pub fn from_spec(spec: &[(&str, &[&str])]) -> Result<Self, ParseRuleError> {
        let mut rules = Self::new();
        for (field, parts) in spec {
            let (selector, processors) =
                parts
                    .split_first()
                    .ok_or_else(|| ParseRuleError::MissingSelector {
                        field: field.to_string(),
                    })?;
            rules.insert(*field, ParseRule::new(selector, processors)?);
        }
        Ok(rules)
    }

    pub fn insert(&mut self, field: impl Into<String>, rule: ParseRule) {
        self.0.insert(field.into(), rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParseRule)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
