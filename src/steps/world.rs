use std::path::PathBuf;
use std::sync::Arc;

use cucumber::World;
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::config::S3Config;
use crate::s3::{ObjectStore, StorageAdapter};
use crate::steps::state::{DIRECTORY, ScenarioState};
use crate::utils::path::FileResolver;

/// 进程内共享的适配器，配置只在第一次使用时读取一次
static SHARED_ADAPTER: OnceCell<StorageAdapter> = OnceCell::const_new();

/// 获取进程内共享的存储适配器
///
/// 第一次调用时从环境变量构建 [`S3Config`] 并连接，之后所有场景复用同一个客户端。
pub async fn shared_adapter() -> StorageAdapter {
    SHARED_ADAPTER
        .get_or_init(|| async { StorageAdapter::connect(&S3Config::from_env()).await })
        .await
        .clone()
}

/// 每个场景一个的 cucumber World
///
/// 运行器可以在场景开始前通过 [`S3World::use_adapter`] 或 [`S3World::use_store`]
/// 注入存储；未注入时使用 [`shared_adapter`]。
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct S3World {
    pub state: ScenarioState,
    pub files: FileResolver,
    adapter: Option<StorageAdapter>,
}

impl S3World {
    pub fn new() -> Self {
        Self {
            state: ScenarioState::new(),
            files: FileResolver::from_env(),
            adapter: None,
        }
    }

    /// 使用运行器预先连接好的适配器
    pub fn use_adapter(&mut self, adapter: StorageAdapter) {
        self.adapter = Some(adapter);
    }

    /// 使用指定的存储客户端代替 S3
    pub fn use_store(&mut self, store: Arc<dyn ObjectStore>) {
        self.use_adapter(StorageAdapter::new(store));
    }

    /// 获取存储适配器，未注入时使用进程内共享的适配器
    pub async fn adapter(&mut self) -> StorageAdapter {
        if let Some(adapter) = &self.adapter {
            return adapter.clone();
        }
        let adapter = shared_adapter().await;
        self.adapter = Some(adapter.clone());
        adapter
    }

    pub fn fill(&self, text: &str) -> String {
        self.state.fill(text)
    }

    /// 解析本地文件路径
    ///
    /// 场景状态中设置了字符串变量 `directory` 时以它为根目录。
    pub fn local_path(&self, name: &str) -> PathBuf {
        match self.state.get(DIRECTORY).and_then(|dir| dir.as_str()) {
            Some(dir) => FileResolver::new(dir).resolve(name),
            None => self.files.resolve(name),
        }
    }

    pub fn record<T: Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        self.state.set_last_run(value)?;
        Ok(())
    }
}

impl Default for S3World {
    fn default() -> Self {
        Self::new()
    }
}
