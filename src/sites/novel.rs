// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 小说站点共用的实体与命令
//!
//! 书籍页给出标题与章节列表，每个章节页是一个片段；
//! `scrapeBook` 依次抓取书籍与全部片段，`buildBook` 把片段聚合为 txt 或 html

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::domain::models::chapter::{ChapterInfo, ChapterKey, CombinedDocument};
use crate::domain::models::parse_rule::{ParseRuleError, ParseRules};
use crate::domain::models::record::{FragmentRef, Record};
use crate::domain::models::site_profile::{param_str, EntityDefinition, RunHandler, SiteProfile};
use crate::domain::services::aggregation_service::AggregationSpec;
use crate::domain::services::render::{build_html_page, generate_toc, htmlize, stitch_html};
use crate::domain::services::site_scraper::{ScrapeOutcome, SiteScraper};
use crate::engines::traits::PageResponse;
use crate::utils::errors::{RepositoryError, ScraperError};
use crate::utils::text::{add_leading_zero, numeric_less, sanitize_file_name};

/// 抽取规则的静态写法 `[(field, [selector, processors...])]`
pub type RuleSpec = &'static [(&'static str, &'static [&'static str])];

/// 章节正文的整理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStyle {
    /// 每一行单独成段，段间空一行
    LineRuns,
    /// 按空行分段，去掉第一段（页面标题），段内换行保留
    Paragraphs,
}

impl ContentStyle {
    pub fn format(self, raw: &str) -> String {
        match self {
            ContentStyle::LineRuns => raw
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
            ContentStyle::Paragraphs => raw
                .split("\n\n")
                .map(str::trim)
                .skip(1)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// html 模式下整书输出的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullBookLayout {
    /// `{id}/_html/_full.html`，段落替换为换行
    InlineHtml,
    /// `{id}/_mobi/{title}.html`，用于转换电子书
    Mobi,
}

/// 单个小说站点的差异部分
#[derive(Debug, Clone, Copy)]
pub struct NovelSite {
    pub site_id: &'static str,
    pub base_url: &'static str,
    pub book_rules: RuleSpec,
    pub content_rules: RuleSpec,
    pub content_style: ContentStyle,
    /// html 文件名中章节序号的宽度
    pub chapter_width: usize,
    pub full_book: FullBookLayout,
}

impl NovelSite {
    pub fn profile(&self) -> Result<SiteProfile, ParseRuleError> {
        Ok(SiteProfile::new(self.site_id, self.base_url)
            .with_entity(
                "book",
                BookEntity {
                    rules: ParseRules::from_spec(self.book_rules)?,
                },
            )
            .with_entity(
                "fragment",
                FragmentEntity {
                    rules: ParseRules::from_spec(self.content_rules)?,
                    style: self.content_style,
                },
            )
            .with_run("scrapeBook", ScrapeBook)
            .with_run("buildBook", BuildBook { site: *self }))
    }

    fn html_spec(&self, book_id: &str, title: &str, fragments: Vec<FragmentRef>) -> AggregationSpec {
        let width = self.chapter_width;
        let spec = AggregationSpec::new(
            fragments,
            "_html",
            move |fragment: &FragmentRef| {
                let ordinal = fragment.id.split('_').next().unwrap_or_default();
                ChapterKey::named(
                    format!(
                        "{}-{}.html",
                        add_leading_zero(ordinal, width),
                        sanitize_file_name(&fragment.name)
                    ),
                    fragment.name.clone(),
                )
            },
            |a: &FragmentRef, b: &FragmentRef| numeric_less(&a.id, &b.id),
        )
        .with_post_processor(generate_toc)
        .with_post_processor(htmlize)
        .with_post_processor(build_html_page);

        let book_id = book_id.to_string();
        let title = sanitize_file_name(title);
        match self.full_book {
            FullBookLayout::InlineHtml => spec.with_cleanup(move |chapters: &[ChapterInfo]| {
                let content = chapters
                    .iter()
                    .filter_map(|chapter| chapter.html_content.as_deref())
                    .map(|html| html.replace("<p>", "<br />\n").replace("</p>", ""))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                Some(CombinedDocument {
                    dir: format!("{}/_html", book_id),
                    file_name: "_full.html".to_string(),
                    content,
                })
            }),
            FullBookLayout::Mobi => spec.with_cleanup(move |chapters: &[ChapterInfo]| {
                Some(CombinedDocument {
                    dir: format!("{}/_mobi", book_id),
                    file_name: format!("{}.html", title),
                    content: stitch_html(chapters),
                })
            }),
        }
    }
}

fn txt_spec(title: &str, fragments: Vec<FragmentRef>) -> AggregationSpec {
    let file_name = format!("{}.txt", sanitize_file_name(title));
    AggregationSpec::new(
        fragments,
        "_fulltxt",
        move |_: &FragmentRef| ChapterKey::new(file_name.clone()),
        |a: &FragmentRef, b: &FragmentRef| numeric_less(&a.id, &b.id),
    )
}

/// 书籍页
struct BookEntity {
    rules: ParseRules,
}

#[async_trait]
impl EntityDefinition for BookEntity {
    fn build_url(&self, base_url: &str, params: &[Value]) -> Result<String, ScraperError> {
        Ok(format!("{}/book/{}/", base_url, param_str(params, 0, "bookId")?))
    }

    fn parse_rules(&self) -> &ParseRules {
        &self.rules
    }

    /// 以 bookId 为 id，章节链接按出现顺序编号为片段
    async fn post_parse(
        &self,
        _scraper: &SiteScraper,
        record: &mut Record,
        params: &[Value],
    ) -> Result<(), ScraperError> {
        record.set_id(param_str(params, 0, "bookId")?);

        let links = match record.remove("fragments") {
            Some(Value::Array(links)) => links,
            _ => Vec::new(),
        };
        let fragments: Vec<FragmentRef> = links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                FragmentRef::new(
                    (i + 1).to_string(),
                    link.get("text").and_then(Value::as_str).unwrap_or_default(),
                    link.get("href").and_then(Value::as_str).unwrap_or_default(),
                )
            })
            .collect();
        record
            .set_fragments(&fragments)
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}

/// 章节页，参数为 `[bookId, fragment]`
struct FragmentEntity {
    rules: ParseRules,
    style: ContentStyle,
}

fn fragment_param(params: &[Value]) -> Result<FragmentRef, ScraperError> {
    let value = params
        .get(1)
        .cloned()
        .ok_or_else(|| ScraperError::InvalidParams("缺少参数 fragment (位置 1)".to_string()))?;
    serde_json::from_value(value).map_err(|e| ScraperError::InvalidParams(format!("无效的片段: {}", e)))
}

#[async_trait]
impl EntityDefinition for FragmentEntity {
    fn build_url(&self, _base_url: &str, params: &[Value]) -> Result<String, ScraperError> {
        let fragment = fragment_param(params)?;
        if fragment.url.is_empty() {
            return Err(ScraperError::InvalidParams(format!("片段 {} 没有地址", fragment.id)));
        }
        Ok(fragment.url)
    }

    fn parse_rules(&self) -> &ParseRules {
        &self.rules
    }

    /// 正文写入文本块存储，记录中只保留片段的元数据
    async fn post_parse(
        &self,
        scraper: &SiteScraper,
        record: &mut Record,
        params: &[Value],
    ) -> Result<(), ScraperError> {
        let raw = match record.remove("rawContent") {
            Some(Value::String(raw)) if !raw.trim().is_empty() => raw,
            _ => return Ok(()),
        };
        let book_id = param_str(params, 0, "bookId")?;
        let fragment = fragment_param(params)?;

        scraper
            .save_fragment_content(book_id, &fragment.id, &self.style.format(&raw))
            .await?;

        if let Value::Object(fields) = serde_json::to_value(&fragment).map_err(RepositoryError::from)? {
            for (key, value) in fields {
                record.insert(key, value);
            }
        }
        record.insert("fragmentId", fragment.id.clone());
        record.insert("bookId", book_id);
        record.set_id(format!("{}/{}", book_id, fragment.id));
        Ok(())
    }

    fn is_valid_page(&self, page: &PageResponse) -> bool {
        !page.is_not_found()
    }
}

/// `scrapeBook <bookId>`
struct ScrapeBook;

#[async_trait]
impl RunHandler for ScrapeBook {
    async fn execute(&self, scraper: &SiteScraper, params: &[Value]) -> Result<(), ScraperError> {
        let book_id = param_str(params, 0, "bookId")?;

        let book = match scraper.scrape("book", params).await? {
            ScrapeOutcome::Success(book) => book,
            ScrapeOutcome::Skipped(reason) => {
                return Err(ScraperError::Profile(format!(
                    "{} is not a valid item: {:?}",
                    book_id, reason
                )))
            }
        };
        scraper.log(&format!("scraping: {}", book.get_str("title").unwrap_or(book_id)));

        let fragments = book.fragments().map_err(RepositoryError::from)?;
        let mut skipped = 0;
        for fragment in &fragments {
            let fragment_value = serde_json::to_value(fragment).map_err(RepositoryError::from)?;
            let outcome = scraper
                .scrape("fragment", &[Value::String(book_id.to_string()), fragment_value])
                .await?;
            if let ScrapeOutcome::Skipped(reason) = outcome {
                warn!("fragment {} skipped: {:?}", fragment.id, reason);
                skipped += 1;
            }
        }

        scraper.log(&format!(
            "scraped {} of {} fragments",
            fragments.len() - skipped,
            fragments.len()
        ));
        Ok(())
    }
}

/// `buildBook <bookId> [txt|html]`
struct BuildBook {
    site: NovelSite,
}

#[async_trait]
impl RunHandler for BuildBook {
    async fn execute(&self, scraper: &SiteScraper, params: &[Value]) -> Result<(), ScraperError> {
        let book_id = param_str(params, 0, "bookId")?;
        let output_type = params.get(1).and_then(Value::as_str).unwrap_or("txt");

        let book = scraper
            .find_record("book", book_id)
            .await?
            .ok_or_else(|| ScraperError::Profile(format!("{} is not a valid item", book_id)))?;
        let title = book.get_str("title").unwrap_or(book_id).to_string();
        let fragments = book.fragments().map_err(RepositoryError::from)?;

        let spec = match output_type {
            "html" => self.site.html_spec(book_id, &title, fragments),
            _ => txt_spec(&title, fragments),
        };
        let report = scraper.aggregate_fragments(book_id, spec).await?;

        if !report.missing_fragments.is_empty() {
            warn!(
                "{} fragments of {} have no body: {:?}",
                report.missing_fragments.len(),
                book_id,
                report.missing_fragments
            );
        }
        scraper.log(&format!(
            "built {} ({}) with {} chapters",
            title,
            output_type,
            report.chapters.len()
        ));
        Ok(())
    }
}
