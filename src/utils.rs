//! 工具函数模块
//!
//! 此模块包含了项目中使用的各种工具函数：
//! - 路径处理工具（目录规范化、文件名提取、本地路径解析）
//! - 场景变量模板替换

pub mod path;
pub mod template;
