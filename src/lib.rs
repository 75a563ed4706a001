//! S3 场景步骤库
//!
//! 这是一组基于 cucumber 的步骤定义，让自然语言场景驱动 S3 兼容存储，主要功能包括：
//! - 检查存储桶是否存在，测试时创建存储桶
//! - 上传、下载、删除和列举文件
//! - 在参数中使用 `${name}` 引用场景变量，结果保存在 `lastRun`
//!
//! 这不是通用的存储客户端：每个操作只发送一次请求，不重试也不翻页。

pub mod config;
pub mod error;
pub mod s3;
pub mod steps;
pub mod telemetry;
pub mod utils;

pub use config::S3Config;
pub use error::{ErrorKind, StorageError};
pub use s3::{MemoryStore, ObjectStore, StorageAdapter};
pub use steps::S3World;
