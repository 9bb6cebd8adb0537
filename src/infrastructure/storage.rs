// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::config::settings::StorageSettings;
use crate::domain::repositories::blob_repository::{BlobRepository, StorageError};

/// 本地文件系统存储实现
///
/// 路径相对于站点根目录 `stash_path/siteId`
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn get_full_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.split('/').any(|segment| segment == "..") {
            return Err(StorageError::Other(format!("Path escapes stash root: {}", key)));
        }
        Ok(self.base_path.join(key.trim_start_matches('/')))
    }
}

#[async_trait]
impl BlobRepository for LocalBlobStore {
    async fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let full_path = self.get_full_path(dir)?;

        let mut entries = match fs::read_dir(&full_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('_') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read(&self, path: &str) -> Result<Option<String>, StorageError> {
        let full_path = self.get_full_path(path)?;

        match fs::read_to_string(&full_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write(&self, dir: &str, name: &str, content: &str) -> Result<(), StorageError> {
        let dir_path = self.get_full_path(dir)?;
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::Other(format!("Invalid file name: {:?}", name)));
        }

        // 确保目录存在
        fs::create_dir_all(&dir_path).await?;

        let mut file = fs::File::create(dir_path.join(name)).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

/// 存储工厂函数，返回站点 `site_id` 的文本块存储
pub fn create_blob_repository(settings: &StorageSettings, site_id: &str) -> Arc<dyn BlobRepository> {
    Arc::new(LocalBlobStore::new(Path::new(&settings.stash_path).join(site_id)))
}

/// 测试用的内存存储实现
pub struct InMemoryBlobStore {
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// 当前保存的全部路径
    pub async fn paths(&self) -> Vec<String> {
        self.data.read().await.keys().cloned().collect()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn join_key(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[async_trait]
impl BlobRepository for InMemoryBlobStore {
    async fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let prefix = join_key(dir, "");
        let map = self.data.read().await;
        let mut names: Vec<String> = map
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty() && !name.starts_with('_'))
            .map(str::to_string)
            .collect();
        names.dedup();
        Ok(names)
    }

    async fn read(&self, path: &str) -> Result<Option<String>, StorageError> {
        let map = self.data.read().await;
        Ok(map.get(path.trim_start_matches('/')).cloned())
    }

    async fn write(&self, dir: &str, name: &str, content: &str) -> Result<(), StorageError> {
        let mut map = self.data.write().await;
        map.insert(join_key(dir, name), content.to_string());
        Ok(())
    }
}
