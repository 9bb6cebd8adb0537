// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层依赖的两类外部存储：
/// - 记录仓库（record_repository）：按集合存放条目记录、待抓取地址和黑名单
/// - 文本块仓库（blob_repository）：按路径存放片段正文和章节输出
///
/// 具体实现由基础设施层提供，抓取器在构造时注入。
pub mod blob_repository;
pub mod record_repository;
