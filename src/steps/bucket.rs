//! 存储桶步骤

use anyhow::ensure;
use cucumber::{given, then};
use tracing::info;

use crate::steps::world::S3World;

#[given(regex = r#"^bucket "([^"]*)" exists on S3$"#)]
async fn bucket_exists_on_s3(world: &mut S3World, bucket: String) -> anyhow::Result<()> {
    let bucket = world.fill(&bucket);
    let exists = world.adapter().await.bucket_exists(&bucket).await?;
    ensure!(exists, "Bucket {} does not exist on S3", bucket);
    Ok(())
}

#[given(regex = r#"^bucket "([^"]*)" is not on S3$"#)]
async fn bucket_is_not_on_s3(world: &mut S3World, bucket: String) -> anyhow::Result<()> {
    let bucket = world.fill(&bucket);
    let exists = world.adapter().await.bucket_exists(&bucket).await?;
    ensure!(!exists, "Bucket {} does exist on S3", bucket);
    Ok(())
}

#[then(regex = r#"^bucket "([^"]*)" exists$"#)]
async fn then_bucket_exists(world: &mut S3World, bucket: String) -> anyhow::Result<()> {
    let bucket = world.fill(&bucket);
    let exists = world.adapter().await.bucket_exists(&bucket).await?;
    ensure!(exists, "The bucket {} does not exist on S3", bucket);
    Ok(())
}

/// 仅用于测试：在 S3 上创建存储桶
#[given(regex = r#"^bucket "([^"]*)" is created on S3$"#)]
async fn bucket_is_created(world: &mut S3World, bucket: String) -> anyhow::Result<()> {
    let bucket = world.fill(&bucket);
    let receipt = world.adapter().await.create_bucket(&bucket).await?;
    info!(bucket = %bucket, location = ?receipt.location, "test bucket created");
    Ok(())
}
