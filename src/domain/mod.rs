// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心逻辑，包括：
/// - 领域模型（models）：记录、抽取规则、章节与站点配置
/// - 仓库接口（repositories）：记录库与文本块存储的抽象接口
/// - 服务（services）：抓取、抽取与聚合
///
/// 领域层不依赖于任何具体的存储实现。
pub mod models;
pub mod repositories;
pub mod services;
