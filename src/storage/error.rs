use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// 存储操作错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage credentials are not configured")]
    MissingCredentials,

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    #[error("{0}")]
    Provider(String),

    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 为一次外部存储调用加上超时。
///
/// # 参数
///
/// * `operation` - 操作名称，用于错误信息与日志。
/// * `limit` - 超时时长。
/// * `future` - 实际的存储调用。
///
/// # 返回值
///
/// 存储调用的结果；超时则返回 `StorageError::Timeout`。
pub async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    future: F,
) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?limit, "storage call timed out");
            Err(StorageError::Timeout { operation, limit })
        }
    }
}
