// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含记录模型、站点配置、仓库接口以及抓取与聚合服务
pub mod domain;

/// 引擎模块
///
/// 实现页面驱动：浏览器驱动与 HTTP 驱动
pub mod engines;

/// 基础设施模块
///
/// 提供记录库、文本块存储和指标导出的具体实现
pub mod infrastructure;

/// 站点模块
///
/// 内置的站点配置
pub mod sites;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
