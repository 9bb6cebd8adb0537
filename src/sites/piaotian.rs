// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::sites::novel::{ContentStyle, FullBookLayout, NovelSite};

/// 飘天文学，正文第一段是页面内的章节标题
pub const SITE: NovelSite = NovelSite {
    site_id: "piaotian",
    base_url: "https://www.ptwxz.com",
    book_rules: &[
        ("title", &[".title > h1", "op:text", "single"]),
        ("fragments", &[".mainbody .centent li > a", "el:a"]),
    ],
    content_rules: &[("rawContent", &["#content", "op:text", "single"])],
    content_style: ContentStyle::Paragraphs,
    chapter_width: 2,
    full_book: FullBookLayout::Mobi,
};
