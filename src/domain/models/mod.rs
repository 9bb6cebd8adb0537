// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心数据结构，包括：
/// - 条目记录（record）：开放字段的抽取结果、片段引用、待抓取地址和黑名单
/// - 抽取规则（parse_rule）：`[selector, ...processors]` 形式的声明式规则
/// - 站点配置（site_profile）：实体定义和命名流程
/// - 章节（chapter）：聚合阶段的章节元数据和目录指针
pub mod chapter;
pub mod parse_rule;
pub mod record;
pub mod site_profile;
