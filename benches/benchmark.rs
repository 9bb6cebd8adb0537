// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 性能基准测试套件
//!
//! 覆盖聚合阶段的纯计算部分（分组与排序）以及规则抽取。

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use stashrs::domain::models::chapter::ChapterKey;
use stashrs::domain::models::parse_rule::ParseRules;
use stashrs::domain::models::record::FragmentRef;
use stashrs::domain::services::aggregation_service::{group_fragments, stable_sort_by_less};
use stashrs::domain::services::extraction_service::ExtractionService;
use stashrs::utils::text::numeric_less;

/// 生成 `chapters` 章、每章 `pages` 页的片段，顺序打乱
fn fragments(chapters: usize, pages: usize) -> Vec<FragmentRef> {
    let mut list = Vec::with_capacity(chapters * pages);
    for page in (1..=pages).rev() {
        for chapter in 1..=chapters {
            list.push(FragmentRef::new(
                format!("{}_{}", chapter, page),
                format!("第{}章", chapter),
                format!("https://example.com/{}_{}.html", chapter, page),
            ));
        }
    }
    list
}

/// 基准测试：片段分组与组内排序
fn benchmark_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping");

    for chapters in [10, 100, 1000].iter() {
        let input = fragments(*chapters, 8);
        group.bench_with_input(BenchmarkId::new("group_and_sort", chapters), &input, |b, input| {
            b.iter(|| {
                let mut grouped = group_fragments(black_box(input), |f| {
                    let chapter = f.id.split('_').next().unwrap_or_default();
                    ChapterKey::named(format!("{}.html", chapter), f.name.clone())
                });
                for chapter in &mut grouped {
                    stable_sort_by_less(&mut chapter.fragments, |a, b| numeric_less(&a.id, &b.id));
                }
                black_box(grouped)
            });
        });
    }

    group.finish();
}

/// 基准测试：目录页抽取
fn benchmark_extraction(c: &mut Criterion) {
    let mut html = String::from("<html><body><h1 class=\"title\">书名</h1><dl id=\"list\">");
    for i in 1..=2000 {
        html.push_str(&format!("<dd><a href=\"/book/1/{}.html\">第{}章</a></dd>", i, i));
    }
    html.push_str("</dl></body></html>");

    let rules = ParseRules::from_spec(&[
        ("title", &["h1.title", "op:text", "single"]),
        ("fragments", &["#list dd > a", "el:a"]),
    ])
    .expect("valid rules");

    c.bench_function("extract_toc_2000", |b| {
        b.iter(|| black_box(ExtractionService::extract(black_box(&html), "https://example.com/book/1/", &rules)))
    });
}

criterion_group!(benches, benchmark_grouping, benchmark_extraction);
criterion_main!(benches);
