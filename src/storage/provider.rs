//! 存储提供方抽象
//!
//! `Connector` 负责认证并产出会话，`StorageSession` 提供会话上的文件夹与文件操作。

use super::error::StorageError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// 账户根目录下的一个文件夹
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    name: String,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 文件夹在对象存储中的键前缀，形如 `auth_files/`
    pub fn prefix(&self) -> String {
        format!("{}/", self.name)
    }

    /// 文件夹内某个文件的完整对象键
    pub fn key_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.name, file_name)
    }
}

/// 已认证的存储会话
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageSession: Send + Sync {
    /// 在账户根目录的直接子项中按名称精确查找文件夹。
    async fn find_folder(&self, name: &str) -> Result<Option<Folder>, StorageError>;

    /// 创建文件夹；文件夹已存在时同样视为成功。
    async fn create_folder(&self, name: &str) -> Result<Folder, StorageError>;

    /// 将本地文件上传到文件夹中，返回存储端的对象键。
    async fn upload(
        &self,
        folder: &Folder,
        file_name: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// 列出文件夹的直接子项名称。
    async fn list(&self, folder: &Folder) -> Result<Vec<String>, StorageError>;
}

/// 存储会话的建立者
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// 认证并等待存储端就绪。
    async fn connect(&self) -> Result<Arc<dyn StorageSession>, StorageError>;
}
