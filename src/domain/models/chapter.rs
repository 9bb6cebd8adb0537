// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::models::record::FragmentRef;

/// 聚合函数的输出：片段归属的章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterKey {
    /// 输出文件名，同名的片段合并为一章
    pub file_name: String,
    /// 章节标题，缺省时使用文件名
    pub chapter_name: Option<String>,
}

impl ChapterKey {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            chapter_name: None,
        }
    }

    pub fn named(file_name: impl Into<String>, chapter_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            chapter_name: Some(chapter_name.into()),
        }
    }
}

/// 章节索引项，供后处理器查看全部章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterHeader {
    pub file_name: String,
    pub chapter_name: String,
}

/// 目录指针
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toc {
    /// 从 0 开始的章节序号
    pub current_index: usize,
    pub num_chapter: usize,
    pub prev: Option<ChapterHeader>,
    pub next: Option<ChapterHeader>,
}

/// 单个章节在聚合过程中的元数据
///
/// 后处理器可以写入 `toc`、`html_content` 或 `annotations`，
/// 后续处理器和 `cleanup` 都能看到这些标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub file_name: String,
    pub chapter_name: String,
    pub fragments: Vec<FragmentRef>,
    pub toc: Option<Toc>,
    pub html_content: Option<String>,
    #[serde(default)]
    pub annotations: Map<String, Value>,
}

impl ChapterInfo {
    pub fn new(key: ChapterKey) -> Self {
        let chapter_name = key.chapter_name.unwrap_or_else(|| key.file_name.clone());
        Self {
            file_name: key.file_name,
            chapter_name,
            fragments: Vec::new(),
            toc: None,
            html_content: None,
            annotations: Map::new(),
        }
    }

    pub fn header(&self) -> ChapterHeader {
        ChapterHeader {
            file_name: self.file_name.clone(),
            chapter_name: self.chapter_name.clone(),
        }
    }

    pub fn fragment_ids(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(|f| f.id.as_str())
    }
}

/// `cleanup` 生成的整书输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedDocument {
    /// 相对站点根目录的输出目录
    pub dir: String,
    pub file_name: String,
    pub content: String,
}

impl CombinedDocument {
    pub fn path(&self) -> String {
        format!("{}/{}", self.dir, self.file_name)
    }
}
