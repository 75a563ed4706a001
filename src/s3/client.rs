//! 基于 aws-sdk-s3 的 [`ObjectStore`] 实现

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTimeFormat};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::debug;

use crate::config::DEFAULT_REGION;
use crate::error::{ErrorKind, Result, StorageError};
use crate::s3::store::{
    BucketReceipt, MAX_KEYS, ObjectListing, ObjectStore, ObjectSummary, UploadReceipt,
};

/// 根据服务端错误码确定错误类别
fn classify<E, R>(err: &SdkError<E, R>) -> ErrorKind
where
    E: ProvideErrorMetadata,
{
    match err.as_service_error().and_then(|e| e.code()) {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => ErrorKind::NotFound,
        Some("BucketAlreadyExists" | "BucketAlreadyOwnedByYou") => ErrorKind::AlreadyExists,
        _ => ErrorKind::Transport,
    }
}

fn sdk_error<E, R>(context: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    StorageError::from_sdk(classify(&err), context, err)
}

#[async_trait]
impl ObjectStore for Client {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        debug!("listing buckets");
        let output = self
            .list_buckets()
            .send()
            .await
            .map_err(|e| sdk_error("failed to list buckets", e))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketReceipt> {
        debug!(bucket, "creating bucket");
        let mut req = self.create_bucket().bucket(bucket);

        // us-east-1 以外的区域需要显式声明位置约束
        if let Some(region) = self.config().region() {
            if region.as_ref() != DEFAULT_REGION {
                req = req.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(BucketLocationConstraint::from(region.as_ref()))
                        .build(),
                );
            }
        }

        let output = req
            .send()
            .await
            .map_err(|e| sdk_error(&format!("failed to create bucket {}", bucket), e))?;

        Ok(BucketReceipt {
            location: output.location().map(str::to_string),
        })
    }

    async fn list_objects(&self, bucket: &str) -> Result<ObjectListing> {
        debug!(bucket, "listing objects");
        let output = self
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(MAX_KEYS as i32)
            .send()
            .await
            .map_err(|e| sdk_error(&format!("failed to list objects in {}", bucket), e))?;

        let objects = output
            .contents()
            .iter()
            .map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or(0),
                last_modified: object
                    .last_modified()
                    .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok()),
            })
            .collect();

        Ok(ObjectListing {
            objects,
            truncated: output.is_truncated().unwrap_or(false),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, body: ByteStream) -> Result<UploadReceipt> {
        debug!(bucket, key, "putting object");
        let output = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| sdk_error(&format!("failed to put object {}", key), e))?;

        Ok(UploadReceipt {
            e_tag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!(bucket, key, "getting object");
        let output = self
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(&format!("failed to get object {}", key), e))?;

        let bytes = output.body.collect().await.map_err(|e| {
            StorageError::transport(&format!("failed to read body of {}", key), e)
        })?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        debug!(bucket, key, "deleting object");
        self.delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(&format!("failed to delete object {}", key), e))?;

        Ok(())
    }
}
