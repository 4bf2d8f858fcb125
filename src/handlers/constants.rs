/// 上传表单中文件字段的名称
pub const FILE_FIELD: &str = "authfile";

/// 未附带文件时的响应
pub const NO_FILE_MESSAGE: &str = "No file uploaded.";

/// 目标文件夹尚不存在时列表接口的响应
pub const NO_UPLOADS_MESSAGE: &str = "No uploads yet.";

/// 上传过程中出现非存储端错误时的通用响应
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// 列出文件失败时的通用响应
pub const LIST_ERROR_MESSAGE: &str = "Error fetching files.";

/// 健康检查响应头，报告存储会话是否已建立
pub const STORAGE_SESSION_HEADER: &str = "x-storage-session";
