//! S3模块
//!
//! 该模块负责与对象存储交互：
//! - `store`：存储客户端抽象及其数据类型
//! - `client`：基于 aws-sdk-s3 的实现
//! - `memory`：进程内实现，用于离线运行场景
//! - `adapter`：场景步骤使用的六个存储操作

pub mod adapter;
pub mod client;
pub mod memory;
pub mod store;

// 重新导出常用的类型
pub use adapter::StorageAdapter;
pub use memory::MemoryStore;
pub use store::{
    BucketReceipt, FileEntry, FileRecord, ObjectListing, ObjectStore, ObjectSummary, UploadReceipt,
};
