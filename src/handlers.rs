//! HTTP请求处理模块
//!
//! 此模块包含了处理不同类型HTTP请求的所有处理器：
//! - 上传表单页面
//! - 文件上传处理器
//! - 已上传文件列表处理器
//! - 健康检查处理器

pub mod constants;
pub mod files;
pub mod form;
pub mod health;
pub mod templates;
pub mod upload;

// 重新导出主要的公共接口
pub use files::handle_files;
pub use form::handle_form;
pub use health::handle_health;
pub use upload::handle_upload;
