//! 存储会话管理模块
//!
//! 进程内最多只保留一个已认证的会话。首次需要时才建立连接，
//! 并发的首次调用共享同一次初始化；失败不会被缓存。

use super::error::{StorageError, with_timeout};
use super::provider::{Connector, StorageSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// 惰性建立并缓存存储会话。
pub struct SessionManager {
    connector: Arc<dyn Connector>,
    session: OnceCell<Arc<dyn StorageSession>>,
    timeout: Duration,
}

impl SessionManager {
    /// 创建会话管理器，此时不会发起任何网络请求。
    ///
    /// # 参数
    ///
    /// * `connector` - 负责认证的存储连接器。
    /// * `timeout` - 单次连接尝试的超时时长。
    pub fn new(connector: Arc<dyn Connector>, timeout: Duration) -> Self {
        Self {
            connector,
            session: OnceCell::new(),
            timeout,
        }
    }

    /// 获取共享的存储会话。
    ///
    /// 已有缓存时立即返回；否则认证一次并缓存结果。
    /// 等待中的调用者在初始化成功后直接复用该会话，
    /// 初始化失败时错误返回给当前调用者，下一个调用者会重新尝试。
    ///
    /// # Errors
    ///
    /// 凭据缺失、认证失败或连接超时时返回 `StorageError`。
    pub async fn acquire(&self) -> Result<Arc<dyn StorageSession>, StorageError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                info!("connecting to storage provider");
                match with_timeout("connect", self.timeout, self.connector.connect()).await {
                    Ok(session) => {
                        info!("storage session established");
                        Ok(session)
                    }
                    Err(e) => {
                        warn!(error = %e, "storage connection failed");
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(session))
    }

    /// 当前是否已缓存会话
    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }
}
