//! 配置模块
//!
//! 该模块负责从环境变量加载 S3 端点配置并创建 S3 客户端。
//! 配置在进程启动时构建一次，再以引用方式传给存储适配器。

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use std::env;

/// 默认主机名
pub const DEFAULT_HOST: &str = "localhost";

/// 默认区域
pub const DEFAULT_REGION: &str = "us-east-1";

/// 本服务在端口表中的名称
pub const SERVICE_NAME: &str = "s3";

/// 本地模拟环境中各服务的固定端口
const PORT_MAP: &[(&str, u16)] = &[
    ("apigateway", 4567),
    ("kinesis", 4568),
    ("dynamodb", 4569),
    ("dynamodbstreams", 4570),
    ("s3", 4572),
    ("firehose", 4573),
    ("lambda", 4574),
    ("sns", 4575),
    ("sqs", 4576),
    ("redshift", 4577),
    ("es", 4578),
    ("ses", 4579),
    ("route53", 4580),
    ("cloudformation", 4581),
    ("cloudwatch", 4582),
    ("ssm", 4583),
    ("secretsmanager", 4584),
    ("stepfunctions", 4585),
    ("logs", 4586),
    ("events", 4587),
    ("sts", 4592),
    ("iam", 4593),
    ("ec2", 4597),
    ("kms", 4599),
];

/// 按服务名查找端口
///
/// # 示例
///
/// ```
/// use s3_steps::config::service_port;
///
/// assert_eq!(service_port("s3"), Some(4572));
/// assert_eq!(service_port("unknown"), None);
/// ```
pub fn service_port(service: &str) -> Option<u16> {
    PORT_MAP
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, port)| *port)
}

/// S3 端点配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// 端点主机（可以带端口），端点为 `http://{host}`
    pub host: String,
    /// 为 true 时在主机后追加端口表中 `s3` 的端口
    pub use_port_map: bool,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            use_port_map: false,
            region: DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: true,
        }
    }
}

impl S3Config {
    /// 从环境变量读取配置，先加载 `.env` 文件。
    ///
    /// # 环境变量
    ///
    /// * `S3_HOST` - 端点主机（默认：localhost）
    /// * `USEPORTMAP` - 非空时追加端口表中的端口
    /// * `AWS_REGION` - 区域（默认：us-east-1）
    /// * `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` - 静态凭据，均设置时生效
    /// * `S3_FORCE_PATH_STYLE` - 是否使用路径风格寻址（默认：true）
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 使用给定的查找函数构建配置，便于测试。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        Self {
            host: non_empty("S3_HOST").unwrap_or(defaults.host),
            use_port_map: non_empty("USEPORTMAP").is_some(),
            region: non_empty("AWS_REGION").unwrap_or(defaults.region),
            access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
            force_path_style: non_empty("S3_FORCE_PATH_STYLE")
                .map(|value| !matches!(value.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(defaults.force_path_style),
        }
    }

    /// 计算端点 URL
    ///
    /// # 返回值
    ///
    /// `http://{host}`，启用端口表时为 `http://{host}:{port}`
    pub fn endpoint_url(&self) -> String {
        let mut url = format!("http://{}", self.host);
        if self.use_port_map {
            if let Some(port) = service_port(SERVICE_NAME) {
                url.push_str(&format!(":{}", port));
            }
        }
        url
    }

    /// 使用该配置创建 S3 客户端。
    ///
    /// 同时设置了两个凭据变量时使用静态凭据，否则使用 aws-config 的默认凭据链。
    /// 关闭 SDK 的自动重试，每个操作只发送一次请求。
    pub async fn build_client(&self) -> Client {
        let region = Region::new(self.region.clone());
        let region_provider = RegionProviderChain::first_try(Some(region));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .endpoint_url(self.endpoint_url())
            .retry_config(RetryConfig::disabled());

        if let (Some(key_id), Some(secret)) = (&self.access_key_id, &self.secret_access_key) {
            let credentials =
                Credentials::new(key_id.clone(), secret.clone(), None, None, "s3-steps-env");
            loader = loader.credentials_provider(credentials);
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(self.force_path_style)
            .build();

        Client::from_conf(s3_config)
    }
}
