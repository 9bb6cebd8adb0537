// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod book_flow_test;
pub mod disk_layout_test;
pub mod helpers;
pub mod properties_test;
