// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::repositories::record_repository::RecordRepository;
use crate::utils::errors::RepositoryError;

/// 磁盘记录库
///
/// 每个命名空间一个目录，每个集合一个 JSON 数组文件：
/// `<db_path>/<namespace>/<collection>.json`。
/// 写入在进程内串行，多个进程同时写同一命名空间不安全
pub struct DiskRecordStore {
    root: PathBuf,
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl DiskRecordStore {
    /// 打开命名空间，目录在第一次写入时创建
    ///
    /// # 参数
    ///
    /// * `db_path` - 记录库根目录
    /// * `namespace` - 站点 id，或共享的 "common"
    pub fn new(db_path: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            root: db_path.as_ref().join(namespace),
            collections: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf, RepositoryError> {
        if collection.is_empty() || collection.contains(['/', '\\']) || collection.starts_with('.') {
            return Err(RepositoryError::InvalidParameter(format!(
                "invalid collection name: {:?}",
                collection
            )));
        }
        Ok(self.root.join(format!("{}.json", collection)))
    }

    async fn load(&self, collection: &str) -> Result<Vec<Value>, RepositoryError> {
        let path = self.collection_path(collection)?;
        match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    async fn persist(&self, collection: &str, records: &[Value]) -> Result<(), RepositoryError> {
        let path = self.collection_path(collection)?;
        fs::create_dir_all(&self.root).await?;

        // write then rename so a crash never leaves a truncated collection
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(records)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl RecordRepository for DiskRecordStore {
    async fn upsert(&self, collection: &str, id: &str, data: &Value) -> Result<(), RepositoryError> {
        if id.is_empty() {
            return Err(RepositoryError::InvalidParameter("empty record id".to_string()));
        }

        let mut record = data.clone();
        match record.as_object_mut() {
            Some(map) => {
                map.entry("id")
                    .or_insert_with(|| Value::String(id.to_string()));
            }
            None => {
                return Err(RepositoryError::InvalidParameter(format!(
                    "record {} in {} is not an object",
                    id, collection
                )))
            }
        }

        let mut cache = self.collections.lock().await;
        if !cache.contains_key(collection) {
            let loaded = self.load(collection).await?;
            cache.insert(collection.to_string(), loaded);
        }
        let Some(records) = cache.get_mut(collection) else {
            return Ok(());
        };

        match records.iter().position(|r| record_id(r).as_deref() == Some(id)) {
            Some(index) => records[index] = record,
            None => records.push(record),
        }

        self.persist(collection, records).await?;
        debug!("upsert {}/{}", collection, id);
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError> {
        let mut cache = self.collections.lock().await;
        if !cache.contains_key(collection) {
            let loaded = self.load(collection).await?;
            cache.insert(collection.to_string(), loaded);
        }

        Ok(cache.get(collection).and_then(|records| {
            records
                .iter()
                .find(|r| record_id(r).as_deref() == Some(id))
                .cloned()
        }))
    }

    async fn count(&self, collection: &str) -> Result<usize, RepositoryError> {
        let mut cache = self.collections.lock().await;
        if !cache.contains_key(collection) {
            let loaded = self.load(collection).await?;
            cache.insert(collection.to_string(), loaded);
        }
        Ok(cache.get(collection).map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = DiskRecordStore::new(temp.path(), "uukancc");
            store.upsert("book", "42", &json!({"title": "推理竞技场"})).await.unwrap();
        }

        let store = DiskRecordStore::new(temp.path(), "uukancc");
        assert_eq!(
            store.find_one("book", "42").await.unwrap(),
            Some(json!({"id": "42", "title": "推理竞技场"}))
        );
        assert!(temp.path().join("uukancc").join("book.json").exists());
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_id() {
        let temp = TempDir::new().unwrap();
        let store = DiskRecordStore::new(temp.path(), "site");

        store.upsert("book", "1", &json!({"title": "a", "extra": true})).await.unwrap();
        store.upsert("book", "1", &json!({"title": "b"})).await.unwrap();
        store.upsert("book", "2", &json!({"title": "c"})).await.unwrap();

        assert_eq!(store.count("book").await.unwrap(), 2);
        assert_eq!(
            store.find_one("book", "1").await.unwrap(),
            Some(json!({"id": "1", "title": "b"}))
        );
    }

    #[tokio::test]
    async fn test_numeric_ids_on_disk_match_string_lookup() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("site");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("book.json"), r#"[{"id": 7, "title": "x"}]"#).unwrap();

        let store = DiskRecordStore::new(temp.path(), "site");
        assert!(store.find_one("book", "7").await.unwrap().is_some());
        assert_eq!(store.count("missing").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_numeric_id_is_stored_as_given() {
        let temp = TempDir::new().unwrap();
        {
            let store = DiskRecordStore::new(temp.path(), "site");
            store.upsert("fragment", "7", &json!({"id": 7, "title": "x"})).await.unwrap();
            assert_eq!(
                store.find_one("fragment", "7").await.unwrap(),
                Some(json!({"id": 7, "title": "x"}))
            );
        }

        let store = DiskRecordStore::new(temp.path(), "site");
        store.upsert("fragment", "7", &json!({"id": 7, "title": "y"})).await.unwrap();
        assert_eq!(store.count("fragment").await.unwrap(), 1);
        assert_eq!(
            store.find_one("fragment", "7").await.unwrap(),
            Some(json!({"id": 7, "title": "y"}))
        );
    }

    #[tokio::test]
    async fn test_rejects_bad_collection_and_non_object() {
        let temp = TempDir::new().unwrap();
        let store = DiskRecordStore::new(temp.path(), "site");

        assert!(store.upsert("../x", "1", &json!({})).await.is_err());
        assert!(store.upsert("book", "1", &json!([1, 2])).await.is_err());
        assert!(store.upsert("book", "", &json!({})).await.is_err());
    }
}
