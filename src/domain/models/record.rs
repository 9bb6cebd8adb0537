// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 条目记录
///
/// 抽取结果是开放的键值容器，只有两个保留字段：
/// `id`（在站点 + 实体类型内唯一）和容器实体的 `fragments`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// 从存储中读出的 JSON 构造记录，非对象返回 `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// 业务 id，数字 id 会转换为字符串
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(value_as_key)
    }

    pub fn set_id(&mut self, id: impl Into<Value>) {
        self.0.insert("id".to_string(), id.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// 解析 `fragments` 字段，字段缺失时返回空列表
    pub fn fragments(&self) -> Result<Vec<FragmentRef>, serde_json::Error> {
        match self.0.get("fragments") {
            Some(value) => serde_json::from_value(value.clone()),
            None => Ok(Vec::new()),
        }
    }

    pub fn set_fragments(&mut self, fragments: &[FragmentRef]) -> Result<(), serde_json::Error> {
        self.0
            .insert("fragments".to_string(), serde_json::to_value(fragments)?);
        Ok(())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// 片段引用
///
/// `id` 既是正文的存储键，也是聚合时的排序依据（例如 `"3_2"` 表示第 3 章第 2 页）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRef {
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// 站点配置附加的其他字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FragmentRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }
}

/// 待抓取地址
///
/// 只是被动的发现队列，引擎内没有消费者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUrl {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl PendingUrl {
    pub fn new_item(url: impl Into<String>) -> Self {
        Self {
            id: url.into(),
            kind: "item".to_string(),
            status: "new".to_string(),
        }
    }
}

/// 黑名单记录，只追加、永不过期
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistRecord {
    pub id: String,
    pub url: String,
    pub blacklisted_at: String,
}

impl BlacklistRecord {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: url.clone(),
            url,
            blacklisted_at: Utc::now().to_rfc3339(),
        }
    }
}

fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_key(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid fragment id: {}", value)))
}
