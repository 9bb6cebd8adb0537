// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含领域仓库接口的具体实现以及指标导出。
///
/// 包含的子模块：
/// - 记录库（database）：按命名空间落盘的 JSON 集合与内存实现
/// - 指标（metrics）：Prometheus 导出器
/// - 存储（storage）：片段正文与输出文件的文本块存储
///
/// 基础设施层依赖于领域层的抽象接口，领域层不感知具体实现。
pub mod database;
pub mod metrics;
pub mod storage;
