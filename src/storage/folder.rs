//! 目标文件夹的查找与创建
//!
//! 查找与创建在同一把按文件夹名划分的锁内完成，
//! 保证同一进程中并发的首次上传只会创建一次文件夹。

use super::error::{StorageError, with_timeout};
use super::provider::{Folder, StorageSession};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// 按文件夹名划分的进程内锁表
#[derive(Default)]
pub struct FolderLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FolderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// 确保文件夹存在并返回它。
    ///
    /// 文件夹已存在时直接复用，不会再次创建。
    ///
    /// # 参数
    ///
    /// * `session` - 已认证的存储会话。
    /// * `name` - 文件夹名称。
    /// * `timeout` - 每次存储调用的超时时长。
    ///
    /// # Errors
    ///
    /// 查找或创建失败、或调用超时时返回 `StorageError`。
    pub async fn ensure_folder(
        &self,
        session: &dyn StorageSession,
        name: &str,
        timeout: Duration,
    ) -> Result<Folder, StorageError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;

        if let Some(folder) = with_timeout("find folder", timeout, session.find_folder(name)).await? {
            debug!(folder = name, "upload folder already exists");
            return Ok(folder);
        }

        info!(folder = name, "creating upload folder");
        with_timeout("create folder", timeout, session.create_folder(name)).await
    }
}
