//! 工具函数模块
//!
//! 此模块包含了项目中使用的各种工具函数：
//! - HTTP安全响应头中间件
//! - 路径处理工具（文件名提取、MIME类型推断）
//! - 上传临时文件

pub mod headers;
pub mod path;
pub mod temp_file;
