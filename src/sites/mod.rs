// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 站点配置模块
///
/// 内置的站点配置，启动时按 siteId 选择
pub mod novel;
pub mod piaotian;
pub mod uukancc;

use crate::domain::models::site_profile::SiteProfile;
use crate::sites::novel::NovelSite;
use crate::utils::errors::ScraperError;

const SITES: &[NovelSite] = &[uukancc::SITE, piaotian::SITE];

/// 已注册的 siteId
pub fn site_ids() -> impl Iterator<Item = &'static str> {
    SITES.iter().map(|site| site.site_id)
}

/// 按 siteId 构造站点配置
pub fn find(site_id: &str) -> Result<SiteProfile, ScraperError> {
    let site = SITES
        .iter()
        .find(|site| site.site_id == site_id)
        .ok_or_else(|| {
            ScraperError::Profile(format!(
                "unknown site {}, expected one of: {}",
                site_id,
                site_ids().collect::<Vec<_>>().join(", ")
            ))
        })?;
    site.profile()
        .map_err(|e| ScraperError::Profile(format!("{}: {}", site_id, e)))
}
