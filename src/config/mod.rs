//! 上传中继服务的配置模块。
//!
//! 该模块负责从环境变量加载和校验配置。存储账户的凭据在启动时是可选的，
//! 只有在真正访问存储时才会被要求。

use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 8080;

/// 默认目标文件夹名称
pub const DEFAULT_UPLOAD_FOLDER: &str = "auth_files";

/// 默认临时上传目录
pub const DEFAULT_TMP_DIR: &str = "tmp";

/// 默认请求体上限（10 MiB）
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 默认存储调用超时（秒）
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

/// 默认 S3 区域
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid upload folder name {0:?}: must be non-empty and must not contain '/'")]
    InvalidFolder(String),
}

/// 存储账户设置。
///
/// 凭据与存储桶在这里都是可选的：缺失时服务仍可启动，
/// 但任何存储操作都会以 `MissingCredentials` 失败。
#[derive(Clone, Default)]
pub struct S3Settings {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    pub region: String,
    pub endpoint: Option<String>,
}

impl S3Settings {
    /// 访问密钥、私钥与存储桶是否都已配置
    pub fn is_complete(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some() && self.bucket.is_some()
    }
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// 服务配置
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub upload_folder: String,
    pub tmp_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub storage_timeout: Duration,
    pub s3: S3Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            upload_folder: DEFAULT_UPLOAD_FOLDER.to_string(),
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            storage_timeout: Duration::from_secs(DEFAULT_STORAGE_TIMEOUT_SECS),
            s3: S3Settings {
                region: DEFAULT_S3_REGION.to_string(),
                ..S3Settings::default()
            },
        }
    }
}

impl Config {
    /// 从进程环境变量加载配置。
    ///
    /// 调用方应当在此之前调用 `dotenvy::dotenv()` 以加载 `.env` 文件。
    ///
    /// # Errors
    ///
    /// 当某个变量无法解析或文件夹名称非法时返回 `ConfigError`。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 使用给定的查找函数加载配置。
    ///
    /// # 参数
    ///
    /// * `lookup` - 根据变量名返回变量值的函数，空字符串视为未设置。
    ///
    /// # 返回值
    ///
    /// 校验后的配置，或描述第一个非法值的错误。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Config::default();

        let upload_folder = get("UPLOAD_FOLDER").unwrap_or(defaults.upload_folder);
        if upload_folder.is_empty() || upload_folder.contains('/') {
            return Err(ConfigError::InvalidFolder(upload_folder));
        }

        let storage_timeout_secs: u64 = parse_or(
            "STORAGE_TIMEOUT_SECS",
            get("STORAGE_TIMEOUT_SECS"),
            DEFAULT_STORAGE_TIMEOUT_SECS,
        )?;
        if storage_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "STORAGE_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        Ok(Self {
            host: parse_or("HOST", get("HOST"), defaults.host)?,
            port: parse_or("PORT", get("PORT"), defaults.port)?,
            upload_folder,
            tmp_dir: get("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.tmp_dir),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            )?,
            storage_timeout: Duration::from_secs(storage_timeout_secs),
            s3: S3Settings {
                access_key_id: get("S3_ACCESS_KEY_ID"),
                secret_access_key: get("S3_SECRET_ACCESS_KEY"),
                bucket: get("S3_BUCKET"),
                region: get("S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                endpoint: get("S3_ENDPOINT"),
            },
        })
    }

    /// 服务监听地址
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
