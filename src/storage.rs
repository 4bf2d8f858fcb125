//! 存储模块
//!
//! 该模块封装了与外部存储提供方的全部交互：会话的建立与缓存、
//! 目标文件夹的查找与创建、文件上传以及文件夹内容列举。
//! 请求处理器只通过 `Connector` 与 `StorageSession` 两个 trait 访问存储。

pub mod error;
pub mod folder;
pub mod provider;
pub mod s3;
pub mod session;

// 重新导出常用的类型
pub use error::{StorageError, with_timeout};
pub use folder::FolderLocks;
pub use provider::{Connector, Folder, StorageSession};
pub use s3::S3Connector;
pub use session::SessionManager;
