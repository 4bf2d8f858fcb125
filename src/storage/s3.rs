//! S3 存储实现
//!
//! 账户对应一个存储桶，文件夹对应一个键前缀及其零字节标记对象。

use super::error::StorageError;
use super::provider::{Connector, Folder, StorageSession};
use crate::config::S3Settings;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, RequestChecksumCalculation};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 条件写入失败时 S3 返回的状态码
const PRECONDITION_FAILED: u16 = 412;

/// 使用配置中的凭据连接 S3 存储桶。
pub struct S3Connector {
    settings: S3Settings,
}

impl S3Connector {
    pub fn new(settings: S3Settings) -> Self {
        Self { settings }
    }

    /// 使用给定凭据创建 S3 客户端。
    ///
    /// # 返回值
    ///
    /// 配置好的 `aws_sdk_s3::Client`。
    async fn build_client(&self, access_key_id: &str, secret_access_key: &str) -> Client {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "manual-credentials",
        );

        let region_provider =
            RegionProviderChain::first_try(Some(Region::new(self.settings.region.clone())));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region_provider);
        if let Some(endpoint) = &self.settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // 自定义端点通常是 S3 兼容服务，使用路径风格并只在必需时计算校验和
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if self.settings.endpoint.is_some() {
            builder = builder
                .force_path_style(true)
                .request_checksum_calculation(RequestChecksumCalculation::WhenRequired);
        }

        Client::from_conf(builder.build())
    }
}

#[async_trait]
impl Connector for S3Connector {
    async fn connect(&self) -> Result<Arc<dyn StorageSession>, StorageError> {
        let settings = &self.settings;
        let (Some(access_key_id), Some(secret_access_key), Some(bucket)) = (
            settings.access_key_id.as_deref(),
            settings.secret_access_key.as_deref(),
            settings.bucket.as_deref(),
        ) else {
            return Err(StorageError::MissingCredentials);
        };

        let client = self.build_client(access_key_id, secret_access_key).await;

        // 通过 HeadBucket 验证凭据与存储桶可用
        client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageError::Authentication(describe(&e)))?;

        info!(bucket, region = %settings.region, "connected to s3 bucket");
        Ok(Arc::new(S3Session {
            client,
            bucket: bucket.to_string(),
        }))
    }
}

/// 已验证的 S3 会话
pub struct S3Session {
    client: Client,
    bucket: String,
}

impl S3Session {
    /// 列出某个前缀下的直接子项名称，会跟随分页令牌读取全部结果。
    async fn list_children(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter("/")
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| StorageError::Provider(describe(&e)))?;

            for object in output.contents() {
                if let Some(name) = object.key().and_then(|key| key.strip_prefix(prefix)) {
                    // 空名称是文件夹自身的标记对象
                    if !name.is_empty() {
                        names.push(name.to_string());
                    }
                }
            }
            for common_prefix in output.common_prefixes() {
                if let Some(name) = common_prefix
                    .prefix()
                    .and_then(|p| p.strip_prefix(prefix))
                    .map(|p| p.trim_end_matches('/'))
                {
                    if !name.is_empty() {
                        names.push(name.to_string());
                    }
                }
            }

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl StorageSession for S3Session {
    async fn find_folder(&self, name: &str) -> Result<Option<Folder>, StorageError> {
        let folder = Folder::new(name);

        // 前缀带有结尾的 '/'，因此只会命中同名文件夹
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(folder.prefix())
            .delimiter("/")
            .max_keys(1)
            .send()
            .await
            .map_err(|e| StorageError::Provider(describe(&e)))?;

        let exists = output.key_count().unwrap_or(0) > 0
            || !output.contents().is_empty()
            || !output.common_prefixes().is_empty();

        debug!(folder = name, exists, "looked up upload folder");
        Ok(exists.then_some(folder))
    }

    async fn create_folder(&self, name: &str) -> Result<Folder, StorageError> {
        let folder = Folder::new(name);
        let marker = folder.prefix();

        let created = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&marker)
            .if_none_match("*")
            .body(ByteStream::from_static(b""))
            .send()
            .await;

        match created {
            Ok(_) => info!(folder = name, "created folder marker"),
            Err(e) if status_of(&e) == Some(PRECONDITION_FAILED) => {
                debug!(folder = name, "folder marker already present");
            }
            Err(e) => return Err(StorageError::Provider(describe(&e))),
        }

        // 等待标记对象可读后再使用该文件夹
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(&marker)
            .send()
            .await
            .map_err(|e| StorageError::Provider(describe(&e)))?;

        Ok(folder)
    }

    async fn upload(
        &self,
        folder: &Folder,
        file_name: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = folder.key_for(file_name);
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Provider(describe(&e)))?;

        Ok(key)
    }

    async fn list(&self, folder: &Folder) -> Result<Vec<String>, StorageError> {
        self.list_children(&folder.prefix()).await
    }
}

/// 提取 SDK 错误中的 HTTP 状态码
fn status_of<E>(error: &SdkError<E, HttpResponse>) -> Option<u16> {
    error.raw_response().map(|response| response.status().as_u16())
}

/// 将 SDK 错误展开为包含完整错误链的文本
fn describe<E>(error: &E) -> String
where
    E: std::error::Error,
{
    DisplayErrorContext(error).to_string()
}
