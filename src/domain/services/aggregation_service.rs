// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::chapter::{ChapterHeader, ChapterInfo, ChapterKey, CombinedDocument};
use crate::domain::models::record::FragmentRef;
use crate::domain::repositories::blob_repository::{fragment_path, BlobRepository, StorageError};

/// 片段 → 所属章节
pub type Aggregator = Box<dyn Fn(&FragmentRef) -> ChapterKey + Send + Sync>;
/// 片段的“小于”谓词
pub type FragmentSorter = Box<dyn Fn(&FragmentRef, &FragmentRef) -> bool + Send + Sync>;
/// 章节的“小于”谓词
pub type ChapterSorter = Box<dyn Fn(&ChapterInfo, &ChapterInfo) -> bool + Send + Sync>;
/// 章节内容后处理器 `(content, chapter, index) -> content`
pub type PostProcessor = Box<dyn Fn(String, &mut ChapterInfo, &[ChapterHeader]) -> String + Send + Sync>;
/// 全部章节写出后调用一次，可返回整书输出
pub type Cleanup = Box<dyn FnOnce(&[ChapterInfo]) -> Option<CombinedDocument> + Send>;

/// 聚合配置
pub struct AggregationSpec {
    pub fragments: Vec<FragmentRef>,
    /// 相对条目目录的输出目录
    pub out_dir: String,
    pub aggregator: Aggregator,
    pub fragment_sorter: FragmentSorter,
    pub chapter_sorter: Option<ChapterSorter>,
    pub post_processors: Vec<PostProcessor>,
    pub cleanup: Option<Cleanup>,
}

impl AggregationSpec {
    pub fn new<A, S>(fragments: Vec<FragmentRef>, out_dir: impl Into<String>, aggregator: A, fragment_sorter: S) -> Self
    where
        A: Fn(&FragmentRef) -> ChapterKey + Send + Sync + 'static,
        S: Fn(&FragmentRef, &FragmentRef) -> bool + Send + Sync + 'static,
    {
        Self {
            fragments,
            out_dir: out_dir.into(),
            aggregator: Box::new(aggregator),
            fragment_sorter: Box::new(fragment_sorter),
            chapter_sorter: None,
            post_processors: Vec::new(),
            cleanup: None,
        }
    }

    pub fn with_chapter_sorter<F>(mut self, sorter: F) -> Self
    where
        F: Fn(&ChapterInfo, &ChapterInfo) -> bool + Send + Sync + 'static,
    {
        self.chapter_sorter = Some(Box::new(sorter));
        self
    }

    pub fn with_post_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(String, &mut ChapterInfo, &[ChapterHeader]) -> String + Send + Sync + 'static,
    {
        self.post_processors.push(Box::new(processor));
        self
    }

    pub fn with_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce(&[ChapterInfo]) -> Option<CombinedDocument> + Send + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }
}

/// 聚合结果
#[derive(Debug, Clone)]
pub struct AggregationReport {
    /// 按输出顺序排列的章节
    pub chapters: Vec<ChapterInfo>,
    /// 没有正文而被跳过的片段 id
    pub missing_fragments: Vec<String>,
    /// 整书输出的路径
    pub combined: Option<String>,
}

/// 聚合服务
///
/// 把已保存的片段按章节分组、排序、拼接，经过后处理器后写出
pub struct AggregationService {
    blobs: Arc<dyn BlobRepository>,
}

impl AggregationService {
    pub fn new(blobs: Arc<dyn BlobRepository>) -> Self {
        Self { blobs }
    }

    /// 聚合条目的全部片段
    ///
    /// 缺少正文的片段只记录警告并跳过，章节仍会写出
    pub async fn aggregate(&self, item_id: &str, spec: AggregationSpec) -> Result<AggregationReport, StorageError> {
        let AggregationSpec {
            fragments,
            out_dir,
            aggregator,
            fragment_sorter,
            chapter_sorter,
            post_processors,
            cleanup,
        } = spec;

        let mut chapters = group_fragments(&fragments, &aggregator);
        for chapter in &mut chapters {
            stable_sort_by_less(&mut chapter.fragments, &fragment_sorter);
        }
        if let Some(sorter) = &chapter_sorter {
            stable_sort_by_less(&mut chapters, sorter);
        }

        let index: Vec<ChapterHeader> = chapters.iter().map(ChapterInfo::header).collect();
        let output_dir = format!("{}/{}", item_id, out_dir);
        let mut missing_fragments = Vec::new();

        for chapter in &mut chapters {
            let mut parts = Vec::with_capacity(chapter.fragments.len());
            for fragment in &chapter.fragments {
                match self.blobs.read(&fragment_path(item_id, &fragment.id)).await? {
                    Some(body) => parts.push(body),
                    None => {
                        warn!("fragment body missing: {}/{}", item_id, fragment.id);
                        counter!("stashrs_missing_fragments_total").increment(1);
                        missing_fragments.push(fragment.id.clone());
                    }
                }
            }

            let mut content = parts.join("\n");
            for processor in &post_processors {
                content = processor(content, chapter, &index);
            }

            self.blobs.write(&output_dir, &chapter.file_name, &content).await?;
        }

        let combined = match cleanup.and_then(|cleanup| cleanup(&chapters)) {
            Some(document) => {
                self.blobs
                    .write(&document.dir, &document.file_name, &document.content)
                    .await?;
                Some(document.path())
            }
            None => None,
        };

        info!(
            "aggregated {} fragments of {} into {} chapters under {}",
            fragments.len(),
            item_id,
            chapters.len(),
            output_dir
        );

        Ok(AggregationReport {
            chapters,
            missing_fragments,
            combined,
        })
    }

    /// 按文件名分组目录中的文件
    ///
    /// 以 `_` 开头的文件不参与分组；组内按 `sorter` 稳定排序，返回 `dir/name` 路径
    pub async fn group_directory<A, S>(
        &self,
        dir: &str,
        aggregator: A,
        sorter: S,
    ) -> Result<BTreeMap<String, Vec<String>>, StorageError>
    where
        A: Fn(&str) -> String,
        S: Fn(&str, &str) -> bool,
    {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in self.blobs.list(dir).await? {
            groups.entry(aggregator(&name)).or_default().push(name);
        }

        for names in groups.values_mut() {
            names.sort_by(|a, b| less_to_ordering(&sorter, a.as_str(), b.as_str()));
            for name in names.iter_mut() {
                *name = format!("{}/{}", dir, name);
            }
        }
        Ok(groups)
    }

    /// 拼接多个文件并写出，返回写出的路径
    ///
    /// 有标题的文件会先输出一行标题；缺失的文件被跳过
    pub async fn combine_files(
        &self,
        files: &[CombineEntry],
        out_dir: &str,
        out_file: &str,
        converter: Option<&(dyn Fn(String) -> String + Send + Sync)>,
    ) -> Result<String, StorageError> {
        let mut content = Vec::with_capacity(files.len() * 2);
        for entry in files {
            if let Some(heading) = &entry.heading {
                content.push(heading.clone());
            }
            let Some(body) = self.blobs.read(&entry.path).await? else {
                warn!("file missing while combining: {}", entry.path);
                continue;
            };
            content.push(match converter {
                Some(convert) => convert(body),
                None => body,
            });
        }

        self.blobs.write(out_dir, out_file, &content.join("\n")).await?;
        Ok(format!("{}/{}", out_dir, out_file))
    }
}

/// 参与拼接的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineEntry {
    pub path: String,
    pub heading: Option<String>,
}

impl CombineEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            heading: None,
        }
    }

    pub fn with_heading(path: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            heading: Some(heading.into()),
        }
    }
}

/// 按聚合函数分组，章节顺序为首次出现的顺序，同名章节沿用首个标题
pub fn group_fragments<A>(fragments: &[FragmentRef], aggregator: A) -> Vec<ChapterInfo>
where
    A: Fn(&FragmentRef) -> ChapterKey,
{
    let mut chapters: Vec<ChapterInfo> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for fragment in fragments {
        let key = aggregator(fragment);
        let position = match positions.get(&key.file_name) {
            Some(&position) => position,
            None => {
                positions.insert(key.file_name.clone(), chapters.len());
                chapters.push(ChapterInfo::new(key));
                chapters.len() - 1
            }
        };
        chapters[position].fragments.push(fragment.clone());
    }
    chapters
}

/// 用“小于”谓词做稳定排序，相等元素保持原有顺序
pub fn stable_sort_by_less<T, F>(items: &mut [T], less: F)
where
    F: Fn(&T, &T) -> bool,
{
    items.sort_by(|a, b| less_to_ordering(&less, a, b));
}

fn less_to_ordering<T: ?Sized, F>(less: &F, a: &T, b: &T) -> Ordering
where
    F: Fn(&T, &T) -> bool,
{
    if less(a, b) {
        Ordering::Less
    } else if less(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
#[path = "aggregation_service_test.rs"]
mod tests;
