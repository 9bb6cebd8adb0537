// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::repositories::record_repository::RecordRepository;
use crate::utils::errors::RepositoryError;

/// 内存记录库
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: DashMap<String, HashMap<String, Value>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for MemoryRecordStore {
    async fn upsert(&self, collection: &str, id: &str, data: &Value) -> Result<(), RepositoryError> {
        if id.is_empty() {
            return Err(RepositoryError::InvalidParameter("empty record id".to_string()));
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data.clone());
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|records| records.get(id).cloned()))
    }

    async fn count(&self, collection: &str) -> Result<usize, RepositoryError> {
        Ok(self.collections.get(collection).map_or(0, |records| records.len()))
    }
}
