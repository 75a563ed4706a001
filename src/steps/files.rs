//! 文件步骤

use anyhow::{Context, ensure};
use cucumber::{then, when};
use serde_json::json;
use tracing::info;

use crate::steps::world::S3World;

/// 测试文件的固定内容
pub const TEST_FILE_CONTENTS: &str = "this is a test file";

async fn retrieve_list(
    world: &mut S3World,
    bucket: &str,
    path: Option<&str>,
    as_records: bool,
) -> anyhow::Result<()> {
    let bucket = world.fill(bucket);
    let path = path.map(|p| world.fill(p));
    let files = world
        .adapter()
        .await
        .list_bucket_files(&bucket, path.as_deref(), as_records)
        .await?;
    world.record(&files)
}

#[when(regex = r#"^file list of bucket "([^"]*)" on path "([^"]*)" is retrieved$"#)]
async fn file_list_retrieved(
    world: &mut S3World,
    bucket: String,
    path: String,
) -> anyhow::Result<()> {
    retrieve_list(world, &bucket, Some(&path), false).await
}

#[when(regex = r#"^file list of bucket "([^"]*)" on path "([^"]*)" is retrieved as json item$"#)]
async fn file_list_retrieved_as_json(
    world: &mut S3World,
    bucket: String,
    path: String,
) -> anyhow::Result<()> {
    retrieve_list(world, &bucket, Some(&path), true).await
}

#[when(regex = r#"^all files of bucket "([^"]*)" is retrieved$"#)]
async fn all_files_retrieved(world: &mut S3World, bucket: String) -> anyhow::Result<()> {
    retrieve_list(world, &bucket, None, false).await
}

#[when(regex = r#"^all files of bucket "([^"]*)" is retrieved as json item$"#)]
async fn all_files_retrieved_as_json(world: &mut S3World, bucket: String) -> anyhow::Result<()> {
    retrieve_list(world, &bucket, None, true).await
}

#[then(regex = r#"^file exists with name "([^"]*)" at path "([^"]*)" in bucket "([^"]*)"$"#)]
async fn file_exists(
    world: &mut S3World,
    file_name: String,
    path: String,
    bucket: String,
) -> anyhow::Result<()> {
    let file_name = world.fill(&file_name);
    let path = world.fill(&path);
    let bucket = world.fill(&bucket);
    let files = world
        .adapter()
        .await
        .list_bucket_files(&bucket, Some(&path), false)
        .await?;
    ensure!(
        files.iter().any(|file| file.name() == file_name),
        "The file does not exist in {} at path {}",
        bucket,
        path
    );
    Ok(())
}

#[when(regex = r#"^file "([^"]*)" is uploaded to bucket "([^"]*)" at path "([^"]*)"$"#)]
async fn file_uploaded(
    world: &mut S3World,
    file: String,
    bucket: String,
    path: String,
) -> anyhow::Result<()> {
    let file = world.fill(&file);
    let bucket = world.fill(&bucket);
    let path = world.fill(&path);
    let local = world.local_path(&file);
    let receipt = world
        .adapter()
        .await
        .upload_file(&local, &bucket, Some(&path))
        .await?;
    world.record(&receipt)
}

#[when(regex = r#"^file "([^"]*)" is deleted from bucket "([^"]*)" at path "([^"]*)"$"#)]
async fn file_deleted(
    world: &mut S3World,
    file_name: String,
    bucket: String,
    path: String,
) -> anyhow::Result<()> {
    let file_name = world.fill(&file_name);
    let bucket = world.fill(&bucket);
    let path = world.fill(&path);
    let adapter = world.adapter().await;
    adapter.delete_file(&file_name, &bucket, Some(&path)).await?;
    let remaining = adapter.list_bucket_files(&bucket, Some(&path), false).await?;
    world.record(&remaining)
}

#[when(regex = r#"^file "([^"]*)" from bucket "([^"]*)" at path "([^"]*)" is retrieved$"#)]
async fn file_retrieved(
    world: &mut S3World,
    file_name: String,
    bucket: String,
    path: String,
) -> anyhow::Result<()> {
    let file_name = world.fill(&file_name);
    let bucket = world.fill(&bucket);
    let path = world.fill(&path);
    let dest = world.local_path(&file_name);
    let contents = world
        .adapter()
        .await
        .download_file(&file_name, &bucket, Some(&path), &dest)
        .await?;

    let attachment = serde_json::to_string_pretty(&json!({ "lastRun": contents }))?;
    info!("{}", attachment);
    world.record(&contents)
}

/// 仅用于测试：在本地创建内容固定的测试文件
#[when(regex = r#"^test file "([^"]*)" is created$"#)]
async fn test_file_created(world: &mut S3World, file_name: String) -> anyhow::Result<()> {
    let file_name = world.fill(&file_name);
    let path = world.local_path(&file_name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&path, TEST_FILE_CONTENTS)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "test file created");
    Ok(())
}
