//! 对象缓存
//!
//! 值以 JSON 字符串形式保存，由 `get` / `insert` 完成类型转换。

pub mod object_cache;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use object_cache::moka::MokaCacheWrapper;

/// 缓存查询结果
#[derive(Debug, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

impl dyn ObjectCache {
    /// 读取并反序列化缓存值，格式不符时视为存在但无有效值
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        match self.get_raw(key).await {
            CacheResult::Found(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => CacheResult::Found(value),
                Err(e) => {
                    tracing::warn!("Failed to deserialize cached value for key {}: {}", key, e);
                    CacheResult::ExistsButNoValue
                }
            },
            CacheResult::NotFound => CacheResult::NotFound,
            CacheResult::ExistsButNoValue => CacheResult::ExistsButNoValue,
        }
    }

    /// 序列化并写入缓存
    pub async fn insert<T: Serialize>(&self, key: String, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.insert_raw(key, raw).await,
            Err(e) => tracing::warn!("Failed to serialize value for key {}: {}", key, e),
        }
    }
}
