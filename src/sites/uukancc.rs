// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::sites::novel::{ContentStyle, FullBookLayout, NovelSite};

/// UU看书
pub const SITE: NovelSite = NovelSite {
    site_id: "uukancc",
    base_url: "https://cn.uukanshu.cc",
    book_rules: &[
        ("title", &[".book .bookinfo h1.booktitle", "op:text", "single"]),
        ("coverImg", &[".book .bookinfo .p.bookintro img", "el:img", "single"]),
        ("description", &[".book .bookinfo .p.bookintro", "op:text", "op:trim", "single"]),
        ("author", &[".book .bookinfo .booktag a.red", "op:text", "op:trim", "single"]),
        ("fragments", &["#list-chapterAll dd > a", "el:a"]),
    ],
    content_rules: &[("rawContent", &[".book .readcotent.bbb", "op:text", "single"])],
    content_style: ContentStyle::LineRuns,
    chapter_width: 3,
    full_book: FullBookLayout::InlineHtml,
};
