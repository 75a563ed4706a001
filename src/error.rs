//! 错误类型模块
//!
//! 所有存储操作都返回 [`StorageError`]，通过 [`ErrorKind`] 区分失败类别。

use std::error::Error as StdError;
use std::fmt;

use aws_sdk_s3::error::DisplayErrorContext;

/// 存储操作的结果类型
pub type Result<T, E = StorageError> = std::result::Result<T, E>;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 存储桶、对象或本地文件不存在
    NotFound,
    /// 要创建的存储桶已经存在
    AlreadyExists,
    /// SDK 或网络层面的失败
    Transport,
    /// 下载内容不是合法的 UTF-8 文本
    Decode,
    /// 本地文件系统读写失败
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::Transport => "transport error",
            ErrorKind::Decode => "decode error",
            ErrorKind::Io => "io error",
        };
        f.write_str(name)
    }
}

/// 带类别和可读消息的存储错误
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StorageError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl StorageError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// 将 SDK 错误包装为指定类别，消息中包含 SDK 的完整错误上下文。
    ///
    /// # 参数
    ///
    /// * `kind` - 错误类别
    /// * `context` - 描述失败操作的前缀
    /// * `err` - 原始错误，保留为 `source`
    pub fn from_sdk<E>(kind: ErrorKind, context: &str, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: format!("{}: {}", context, DisplayErrorContext(&err)),
            source: Some(Box::new(err)),
        }
    }

    pub fn transport<E>(context: &str, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_sdk(ErrorKind::Transport, context, err)
    }

    /// 包装本地 IO 错误，文件不存在时归类为 [`ErrorKind::NotFound`]。
    pub fn io(context: &str, err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Self {
            kind,
            message: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        }
    }

    /// 在消息前追加上下文，保留类别和原始错误。
    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}\n{}", context, self.message);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
