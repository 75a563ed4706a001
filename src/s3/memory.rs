//! 进程内的 [`ObjectStore`] 实现
//!
//! 按 S3 的方式排序键并限制单页对象数，用于在没有 S3 服务时运行场景。

use std::collections::BTreeMap;
use std::time::SystemTime;

use async_trait::async_trait;
use aws_sdk_s3::primitives::{ByteStream, DateTime, DateTimeFormat};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::s3::store::{
    BucketReceipt, MAX_KEYS, ObjectListing, ObjectStore, ObjectSummary, UploadReceipt,
};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    last_modified: String,
}

type Buckets = BTreeMap<String, BTreeMap<String, StoredObject>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<Buckets>,
}

fn now() -> String {
    DateTime::from(SystemTime::now())
        .fmt(DateTimeFormat::DateTime)
        .unwrap_or_default()
}

fn no_such_bucket(bucket: &str) -> StorageError {
    StorageError::not_found(format!("NoSuchBucket: bucket {} does not exist", bucket))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入对象，便于测试准备数据
    pub async fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        let mut buckets = self.buckets.lock().await;
        buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                last_modified: now(),
            },
        );
    }

    /// 当前存储桶中的所有键
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let buckets = self.buckets.lock().await;
        buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        Ok(self.buckets.lock().await.keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketReceipt> {
        let mut buckets = self.buckets.lock().await;
        if buckets.contains_key(bucket) {
            return Err(StorageError::already_exists(format!(
                "BucketAlreadyOwnedByYou: bucket {} already exists",
                bucket
            )));
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        debug!(bucket, "created in-memory bucket");

        Ok(BucketReceipt {
            location: Some(format!("/{}", bucket)),
        })
    }

    async fn list_objects(&self, bucket: &str) -> Result<ObjectListing> {
        let buckets = self.buckets.lock().await;
        let objects = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        Ok(ObjectListing {
            objects: objects
                .iter()
                .take(MAX_KEYS)
                .map(|(key, object)| ObjectSummary {
                    key: key.clone(),
                    size: object.body.len() as i64,
                    last_modified: Some(object.last_modified.clone()),
                })
                .collect(),
            truncated: objects.len() > MAX_KEYS,
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<UploadReceipt> {
        // 先读完请求体再加锁
        let body = body
            .collect()
            .await
            .map_err(|e| StorageError::transport(&format!("failed to read body for {}", key), e))?
            .into_bytes()
            .to_vec();

        let mut buckets = self.buckets.lock().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        let e_tag = format!("\"{:016x}\"", fingerprint(&body));
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                last_modified: now(),
            },
        );

        Ok(UploadReceipt {
            e_tag: Some(e_tag),
            version_id: None,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let buckets = self.buckets.lock().await;
        let objects = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StorageError::not_found(format!("NoSuchKey: {} does not exist", key)))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let mut buckets = self.buckets.lock().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        // 与 S3 一致，删除不存在的键也算成功
        objects.remove(key);
        Ok(())
    }
}

/// FNV-1a，仅用于生成 ETag
fn fingerprint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_create_bucket_twice_conflicts() {
        let store = MemoryStore::new();
        store.create_bucket("alpha").await.unwrap();
        let err = store.create_bucket("alpha").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(store.list_buckets().await.unwrap(), vec!["alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store.create_bucket("alpha").await.unwrap();

        let receipt = store
            .put_object("alpha", "a/x.txt", ByteStream::from_static(b"hello"))
            .await
            .unwrap();
        assert!(receipt.e_tag.is_some());
        assert_eq!(store.get_object("alpha", "a/x.txt").await.unwrap(), b"hello");

        store.delete_object("alpha", "a/x.txt").await.unwrap();
        let err = store.get_object("alpha", "a/x.txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // 重复删除不报错
        store.delete_object("alpha", "a/x.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_bucket_is_not_found() {
        let store = MemoryStore::new();
        let err = store.list_objects("ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store
            .put_object("ghost", "k", ByteStream::from_static(b""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_listing_is_sorted_and_capped() {
        let store = MemoryStore::new();
        store.create_bucket("big").await.unwrap();
        for i in (0..MAX_KEYS + 5).rev() {
            store.insert("big", &format!("k{:05}", i), "x").await;
        }

        let listing = store.list_objects("big").await.unwrap();
        assert!(listing.truncated);
        assert_eq!(listing.objects.len(), MAX_KEYS);
        assert_eq!(listing.objects[0].key, "k00000");
        assert_eq!(listing.objects[0].size, 1);
    }
}
