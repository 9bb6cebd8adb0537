// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod browser_driver;
pub mod http_driver;
pub mod traits;

use crate::config::settings::DriverSettings;
use crate::engines::browser_driver::BrowserDriver;
use crate::engines::http_driver::HttpDriver;
use crate::engines::traits::{EngineError, PageDriver};
use std::sync::Arc;

/// 页面驱动工厂函数
pub async fn create_page_driver(
    settings: &DriverSettings,
) -> Result<Arc<dyn PageDriver>, EngineError> {
    match settings.kind.as_str() {
        "browser" => Ok(Arc::new(BrowserDriver::launch(settings).await?)),
        "http" => Ok(Arc::new(HttpDriver::new(settings)?)),
        other => Err(EngineError::Other(format!(
            "Unsupported driver kind: {}",
            other
        ))),
    }
}
