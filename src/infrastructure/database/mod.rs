// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 记录库模块
///
/// 提供记录仓库的两种实现：
/// 按命名空间落盘的 JSON 集合文件，以及测试用的内存实现
pub mod disk_store;
pub mod memory_store;
