//! 存储适配器
//!
//! 将场景步骤需要的六个逻辑操作翻译为 [`ObjectStore`] 请求，
//! 并把响应整理成文件名或带元数据的记录。

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info, warn};

use crate::config::S3Config;
use crate::error::{ErrorKind, Result, StorageError};
use crate::s3::store::{
    BucketReceipt, FileEntry, FileRecord, MAX_KEYS, ObjectStore, ObjectSummary, UploadReceipt,
};
use crate::utils::path::{base_name, normalize_dir, object_key, trailing_segment};

#[derive(Clone)]
pub struct StorageAdapter {
    store: Arc<dyn ObjectStore>,
}

impl fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAdapter").finish_non_exhaustive()
    }
}

fn to_entry(name: &str, object: &ObjectSummary, as_records: bool) -> FileEntry {
    if as_records {
        FileEntry::Record(FileRecord {
            name: name.to_string(),
            size: object.size,
            date: object.last_modified.clone(),
        })
    } else {
        FileEntry::Name(name.to_string())
    }
}

impl StorageAdapter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// 两个适配器是否使用同一个存储客户端
    pub fn shares_store_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// 使用配置创建 S3 客户端并包装为适配器
    pub async fn connect(config: &S3Config) -> Self {
        info!(endpoint = %config.endpoint_url(), region = %config.region, "connecting to S3");
        Self::new(Arc::new(config.build_client().await))
    }

    /// 检查存储桶是否存在。
    ///
    /// 列出所有存储桶，与 **小写后** 的 `name` 比较。名称中含大写字母时，
    /// 只有小写形式的存储桶才算存在。
    ///
    /// # Errors
    ///
    /// 列举存储桶失败时返回错误。
    pub async fn bucket_exists(&self, name: &str) -> Result<bool> {
        let wanted = name.to_lowercase();
        let buckets = self.store.list_buckets().await?;
        Ok(buckets.iter().any(|bucket| *bucket == wanted))
    }

    /// 创建存储桶（仅用于测试准备）。
    ///
    /// # Errors
    ///
    /// * [`ErrorKind::AlreadyExists`] - 存储桶已经存在
    /// * 存在性检查或创建请求失败时返回对应错误
    pub async fn create_bucket(&self, name: &str) -> Result<BucketReceipt> {
        if self.bucket_exists(name).await? {
            return Err(StorageError::already_exists(format!(
                "A bucket named {} already exists on S3",
                name
            )));
        }

        let receipt = self.store.create_bucket(name).await?;
        info!(bucket = name, "bucket created");
        Ok(receipt)
    }

    /// 列出存储桶中的文件。
    ///
    /// * `path` 为 `None` 时返回所有对象键的最后一段，不去重。
    /// * `path` 为 `Some` 时只返回该目录的直接子项（键去掉前缀后不含 `/`）。
    /// * `as_records` 为 true 时返回名称、大小和修改时间。
    ///
    /// 只发送一次列举请求，存储桶中超过 1000 个对象时结果会被截断，
    /// 截断时会记录一条警告。
    ///
    /// # Errors
    ///
    /// 列举请求失败时返回错误。
    pub async fn list_bucket_files(
        &self,
        bucket: &str,
        path: Option<&str>,
        as_records: bool,
    ) -> Result<Vec<FileEntry>> {
        let listing = self.store.list_objects(bucket).await?;
        if listing.truncated {
            warn!(
                bucket,
                limit = MAX_KEYS,
                "listing truncated, only the first page of objects is visible"
            );
        }

        let entries = match path {
            None => listing
                .objects
                .iter()
                .map(|object| to_entry(trailing_segment(&object.key), object, as_records))
                .collect(),
            Some(path) => {
                let prefix = normalize_dir(Some(path));
                listing
                    .objects
                    .iter()
                    .filter_map(|object| {
                        let rest = object.key.strip_prefix(prefix.as_str())?;
                        (!rest.contains('/')).then(|| to_entry(rest, object, as_records))
                    })
                    .collect()
            }
        };

        Ok(entries)
    }

    /// 上传本地文件。
    ///
    /// 远端键为 `normalize_dir(path) + 文件名`，只取本地路径的文件名部分。
    ///
    /// # Errors
    ///
    /// 读取本地文件或上传失败时返回错误，消息中包含当前工作目录。
    pub async fn upload_file(
        &self,
        local: &Path,
        bucket: &str,
        path: Option<&str>,
    ) -> Result<UploadReceipt> {
        let key = object_key(path, &base_name(local));
        debug!(local = %local.display(), bucket, key = %key, "uploading file");

        self.upload_inner(local, bucket, &key).await.map_err(|e| {
            let cwd = std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|_| "<unknown>".to_string());
            e.with_context(format!("Current Directory: {}", cwd))
        })
    }

    async fn upload_inner(&self, local: &Path, bucket: &str, key: &str) -> Result<UploadReceipt> {
        let context = format!("failed to read {}", local.display());
        tokio::fs::metadata(local)
            .await
            .map_err(|e| StorageError::io(&context, e))?;
        let body = ByteStream::from_path(local)
            .await
            .map_err(|e| StorageError::from_sdk(ErrorKind::Io, &context, e))?;

        self.store.put_object(bucket, key, body).await
    }

    /// 下载文件并以 UTF-8 文本写入 `dest`。
    ///
    /// # 返回值
    ///
    /// 下载到的文本内容。
    ///
    /// # Errors
    ///
    /// * 请求失败时返回存储错误
    /// * [`ErrorKind::Decode`] - 内容不是合法的 UTF-8
    /// * 写入本地文件失败时返回 IO 错误
    pub async fn download_file(
        &self,
        file_name: &str,
        bucket: &str,
        path: Option<&str>,
        dest: &Path,
    ) -> Result<String> {
        let key = object_key(path, file_name);
        debug!(bucket, key = %key, dest = %dest.display(), "downloading file");

        let bytes = self.store.get_object(bucket, &key).await?;
        let text = String::from_utf8(bytes).map_err(|e| {
            StorageError::from_sdk(ErrorKind::Decode, &format!("{} is not UTF-8 text", key), e)
        })?;

        tokio::fs::write(dest, &text)
            .await
            .map_err(|e| StorageError::io(&format!("failed to write {}", dest.display()), e))?;

        Ok(text)
    }

    /// 删除文件，不返回内容
    pub async fn delete_file(
        &self,
        file_name: &str,
        bucket: &str,
        path: Option<&str>,
    ) -> Result<()> {
        let key = object_key(path, file_name);
        debug!(bucket, key = %key, "deleting file");
        self.store.delete_object(bucket, &key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::store::{MockObjectStore, ObjectListing};

    fn summary(key: &str, size: i64) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            size,
            last_modified: Some("2024-01-02T03:04:05Z".to_string()),
        }
    }

    fn listing_store(keys: &[(&str, i64)]) -> MockObjectStore {
        let objects: Vec<ObjectSummary> = keys.iter().map(|(k, s)| summary(k, *s)).collect();
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .withf(|bucket: &str| bucket == "B")
            .returning(move |_| {
                Ok(ObjectListing {
                    objects: objects.clone(),
                    truncated: false,
                })
            });
        store
    }

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(FileEntry::name).collect()
    }

    #[tokio::test]
    async fn test_bucket_exists_compares_lowercased_name() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_buckets()
            .times(3)
            .returning(|| Ok(vec!["my-bucket".to_string(), "Mixed".to_string()]));
        let adapter = StorageAdapter::new(Arc::new(store));

        assert!(adapter.bucket_exists("my-bucket").await.unwrap());
        assert!(adapter.bucket_exists("MY-Bucket").await.unwrap());
        // 远端名称含大写时永远匹配不上
        assert!(!adapter.bucket_exists("Mixed").await.unwrap());
    }

    #[tokio::test]
    async fn test_bucket_exists_propagates_failure() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_buckets()
            .returning(|| Err(StorageError::new(ErrorKind::Transport, "connection refused")));
        let adapter = StorageAdapter::new(Arc::new(store));

        let err = adapter.bucket_exists("any").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_create_bucket_rejects_existing() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_buckets()
            .returning(|| Ok(vec!["taken".to_string()]));
        store.expect_create_bucket().never();
        let adapter = StorageAdapter::new(Arc::new(store));

        let err = adapter.create_bucket("taken").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(err.message().contains("taken"));
    }

    #[tokio::test]
    async fn test_create_bucket_skips_create_when_check_fails() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_buckets()
            .returning(|| Err(StorageError::new(ErrorKind::Transport, "timeout")));
        store.expect_create_bucket().never();
        let adapter = StorageAdapter::new(Arc::new(store));

        let err = adapter.create_bucket("new").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_create_bucket_returns_receipt() {
        let mut store = MockObjectStore::new();
        store.expect_list_buckets().returning(|| Ok(vec![]));
        store
            .expect_create_bucket()
            .withf(|bucket: &str| bucket == "new")
            .times(1)
            .returning(|_| {
                Ok(BucketReceipt {
                    location: Some("/new".to_string()),
                })
            });
        let adapter = StorageAdapter::new(Arc::new(store));

        let receipt = adapter.create_bucket("new").await.unwrap();
        assert_eq!(receipt.location.as_deref(), Some("/new"));
    }

    #[tokio::test]
    async fn test_list_with_path_returns_direct_children_only() {
        let store = listing_store(&[("a/x.txt", 1), ("a/b/y.txt", 2), ("z.txt", 3)]);
        let adapter = StorageAdapter::new(Arc::new(store));

        let entries = adapter.list_bucket_files("B", Some("a"), false).await.unwrap();
        assert_eq!(names(&entries), vec!["x.txt"]);

        let entries = adapter.list_bucket_files("B", Some("a/"), false).await.unwrap();
        assert_eq!(names(&entries), vec!["x.txt"]);
    }

    #[tokio::test]
    async fn test_list_without_path_returns_trailing_segments() {
        let store = listing_store(&[
            ("a/x.txt", 1),
            ("a/b/y.txt", 2),
            ("z.txt", 3),
            ("c/x.txt", 4),
        ]);
        let adapter = StorageAdapter::new(Arc::new(store));

        let entries = adapter.list_bucket_files("B", None, false).await.unwrap();
        assert_eq!(names(&entries), vec!["x.txt", "y.txt", "z.txt", "x.txt"]);
    }

    #[tokio::test]
    async fn test_list_as_records_carries_size_and_date() {
        let store = listing_store(&[("a/x.txt", 19), ("a/b/y.txt", 2)]);
        let adapter = StorageAdapter::new(Arc::new(store));

        let entries = adapter.list_bucket_files("B", Some("a"), true).await.unwrap();
        assert_eq!(
            entries,
            vec![FileEntry::Record(FileRecord {
                name: "x.txt".to_string(),
                size: 19,
                date: Some("2024-01-02T03:04:05Z".to_string()),
            })]
        );
    }

    #[tokio::test]
    async fn test_list_with_empty_path_returns_root_objects() {
        let store = listing_store(&[("a/x.txt", 1), ("z.txt", 3)]);
        let adapter = StorageAdapter::new(Arc::new(store));

        let entries = adapter.list_bucket_files("B", Some(""), false).await.unwrap();
        assert_eq!(names(&entries), vec!["z.txt"]);
    }

    #[tokio::test]
    async fn test_upload_uses_base_name_for_key() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("report.csv");
        std::fs::write(&local, "a,b\n").unwrap();

        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|bucket: &str, key: &str, _body: &ByteStream| {
                bucket == "B" && key == "data/report.csv"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(UploadReceipt {
                    e_tag: Some("\"etag\"".to_string()),
                    version_id: None,
                })
            });
        let adapter = StorageAdapter::new(Arc::new(store));

        let receipt = adapter.upload_file(&local, "B", Some("data")).await.unwrap();
        assert_eq!(receipt.e_tag.as_deref(), Some("\"etag\""));
    }

    #[tokio::test]
    async fn test_upload_without_path_uses_bare_name() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("plain.txt");
        std::fs::write(&local, "x").unwrap();

        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|_bucket: &str, key: &str, _body: &ByteStream| key == "plain.txt")
            .times(1)
            .returning(|_, _, _| Ok(UploadReceipt::default()));
        let adapter = StorageAdapter::new(Arc::new(store));

        adapter.upload_file(&local, "B", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_missing_file_reports_cwd() {
        let mut store = MockObjectStore::new();
        store.expect_put_object().never();
        let adapter = StorageAdapter::new(Arc::new(store));

        let err = adapter
            .upload_file(Path::new("/definitely/not/here.txt"), "B", Some("data"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().starts_with("Current Directory: "));
    }

    #[tokio::test]
    async fn test_download_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("test.txt");

        let mut store = MockObjectStore::new();
        store
            .expect_get_object()
            .withf(|bucket: &str, key: &str| bucket == "B" && key == "data/test.txt")
            .returning(|_, _| Ok(b"this is a test file".to_vec()));
        let adapter = StorageAdapter::new(Arc::new(store));

        let text = adapter
            .download_file("test.txt", "B", Some("data/"), &dest)
            .await
            .unwrap();
        assert_eq!(text, "this is a test file");
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "this is a test file");
    }

    #[tokio::test]
    async fn test_download_rejects_binary_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("blob.bin");

        let mut store = MockObjectStore::new();
        store
            .expect_get_object()
            .returning(|_, _| Ok(vec![0xff, 0xfe, 0x00]));
        let adapter = StorageAdapter::new(Arc::new(store));

        let err = adapter
            .download_file("blob.bin", "B", None, &dest)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_delete_builds_key() {
        let mut store = MockObjectStore::new();
        store
            .expect_delete_object()
            .withf(|bucket: &str, key: &str| bucket == "B" && key == "data/old.txt")
            .times(1)
            .returning(|_, _| Ok(()));
        let adapter = StorageAdapter::new(Arc::new(store));

        adapter.delete_file("old.txt", "B", Some("data")).await.unwrap();
    }
}
