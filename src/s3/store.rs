//! 存储客户端抽象
//!
//! [`ObjectStore`] 是适配器与具体存储服务之间的接缝，
//! 每个方法对应一次请求/响应往返。

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;

use crate::error::Result;

/// 单次列举请求返回的最大对象数
pub const MAX_KEYS: usize = 1000;

/// 列举结果中的单个对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    /// RFC 3339 格式的最后修改时间
    pub last_modified: Option<String>,
}

/// 单页列举结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    pub objects: Vec<ObjectSummary>,
    /// 存储桶中还有未返回的对象
    pub truncated: bool,
}

/// 创建存储桶的回执
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketReceipt {
    pub location: Option<String>,
}

/// 上传对象的回执
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
}

/// 带元数据的文件条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub name: String,
    pub size: i64,
    pub date: Option<String>,
}

/// 文件列表中的一项：仅名称，或名称加大小和日期
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileEntry {
    Name(String),
    Record(FileRecord),
}

impl FileEntry {
    pub fn name(&self) -> &str {
        match self {
            FileEntry::Name(name) => name,
            FileEntry::Record(record) => &record.name,
        }
    }
}

/// 对象存储客户端
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 列出调用者可见的所有存储桶名称
    async fn list_buckets(&self) -> Result<Vec<String>>;

    async fn create_bucket(&self, bucket: &str) -> Result<BucketReceipt>;

    /// 列出存储桶中的对象，最多返回 [`MAX_KEYS`] 个，不翻页
    async fn list_objects(&self, bucket: &str) -> Result<ObjectListing>;

    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<UploadReceipt>;

    /// 读取对象的全部内容
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
}
