use std::path::{Path, PathBuf};

/// 规范化存储桶中的目录路径
///
/// 非空路径保证以 `/` 结尾；空路径或 `None` 返回空字符串。
/// 对已规范化的路径再次调用结果不变。
///
/// # 示例
///
/// ```
/// use s3_steps::utils::path::normalize_dir;
///
/// assert_eq!(normalize_dir(Some("data")), "data/");
/// assert_eq!(normalize_dir(Some("data/")), "data/");
/// assert_eq!(normalize_dir(Some("")), "");
/// assert_eq!(normalize_dir(None), "");
/// ```
pub fn normalize_dir(path: Option<&str>) -> String {
    match path {
        None | Some("") => String::new(),
        Some(p) if p.ends_with('/') => p.to_string(),
        Some(p) => format!("{}/", p),
    }
}

/// 构建对象键：`normalize_dir(path) + file_name`
pub fn object_key(path: Option<&str>, file_name: &str) -> String {
    format!("{}{}", normalize_dir(path), file_name)
}

/// 取键中最后一个 `/` 之后的部分
///
/// ```
/// use s3_steps::utils::path::trailing_segment;
///
/// assert_eq!(trailing_segment("a/b/y.txt"), "y.txt");
/// assert_eq!(trailing_segment("z.txt"), "z.txt");
/// assert_eq!(trailing_segment("dir/"), "");
/// ```
pub fn trailing_segment(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// 取本地路径的文件名部分，没有文件名时返回空字符串
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 本地文件路径解析器
///
/// 相对文件名拼接到根目录上，绝对路径原样返回。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResolver {
    root: PathBuf,
}

/// 指定根目录的环境变量
pub const FILE_DIR_ENV: &str = "S3_STEPS_FILE_DIR";

impl FileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 根目录取自 `S3_STEPS_FILE_DIR`，未设置时为当前目录
    pub fn from_env() -> Self {
        match std::env::var(FILE_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new("."),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for FileResolver {
    fn default() -> Self {
        Self::new(".")
    }
}
