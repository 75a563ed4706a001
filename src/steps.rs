//! 场景步骤模块
//!
//! 此模块通过 cucumber 注册所有步骤定义：
//! - 存储桶步骤（存在性断言、测试用的创建）
//! - 文件步骤（上传、下载、删除、列举）
//! - 结果步骤（设置变量、断言 `lastRun`）
//!
//! 所有字符串参数在使用前都会替换 `${name}` 引用。

pub mod bucket;
pub mod files;
pub mod results;
pub mod state;
pub mod world;

// 重新导出主要的公共接口
pub use state::{LAST_RUN, ScenarioState};
pub use world::{S3World, shared_adapter};
