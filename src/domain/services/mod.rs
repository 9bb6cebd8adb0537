// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 聚合服务（aggregation_service）：片段分组、排序、拼接与输出
/// - 黑名单（blacklist）：永久跳过的地址
/// - 抽取服务（extraction_service）：在页面快照上执行抽取规则
/// - 渲染（render）：目录、HTML 段落与章节页面等标准后处理器
/// - 站点抓取器（site_scraper）：抓取、抽取、整理、入库的编排
/// - 限流抓取器（throttled_fetcher）：黑名单检查与最小间隔限流
pub mod aggregation_service;
pub mod blacklist;
pub mod extraction_service;
pub mod render;
pub mod site_scraper;
pub mod throttled_fetcher;
