use askama::Template;
use axum::{http::StatusCode, response::Html};
use tracing::error;

use crate::handlers::constants::FILE_FIELD;
use crate::handlers::templates::UploadFormTemplate;

/// 返回上传表单页面
///
/// 表单只在浏览器端限制 `.json` 文件，服务端接受任意类型。
pub async fn handle_form() -> Result<Html<String>, StatusCode> {
    UploadFormTemplate { field: FILE_FIELD }
        .render()
        .map(Html)
        .map_err(|e| {
            error!(error = %e, "failed to render upload form");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
