//! 文件上传中继服务库
//!
//! 这是一个基于Axum的上传中继服务，主要功能包括：
//! - 提供上传表单页面
//! - 接收 multipart 文件上传并转存到外部存储的目标文件夹
//! - 列出目标文件夹中已上传的文件
//! - 为所有响应附加安全加固头部

pub mod config;
pub mod handlers;
pub mod storage;
pub mod utils;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use config::Config;
use std::sync::Arc;
use storage::{Connector, FolderLocks, SessionManager};
use tower_http::trace::TraceLayer;

/// 应用状态，所有请求处理器共享
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
    pub folders: Arc<FolderLocks>,
}

impl AppState {
    /// 创建应用状态，此时不会连接存储端
    ///
    /// # 参数
    ///
    /// * `config` - 服务配置
    /// * `connector` - 存储连接器，首次需要存储时才会被调用
    pub fn new(config: Config, connector: Arc<dyn Connector>) -> Self {
        let sessions = SessionManager::new(connector, config.storage_timeout);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            folders: Arc::new(FolderLocks::new()),
        }
    }
}

/// 创建并配置Axum应用程序
///
/// 此函数设置了完整的路由与中间件：
/// - `GET /` 上传表单
/// - `POST /upload` 文件上传，请求体大小受配置限制
/// - `GET /files` 已上传文件列表
/// - `GET /healthz` 健康检查
/// - 安全响应头与请求追踪中间件
///
/// # Returns
///
/// 返回配置好的Axum Router实例
pub fn app(state: AppState) -> axum::Router {
    let body_limit = state.config.max_upload_bytes;

    axum::Router::new()
        .route("/", get(handlers::handle_form))
        .route("/upload", post(handlers::handle_upload))
        .route("/files", get(handlers::handle_files))
        .route("/healthz", get(handlers::handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(utils::headers::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
