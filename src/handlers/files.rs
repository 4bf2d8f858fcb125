use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::AppState;
use crate::handlers::constants::{INTERNAL_ERROR_MESSAGE, LIST_ERROR_MESSAGE, NO_UPLOADS_MESSAGE};
use crate::handlers::templates::FileListTemplate;
use crate::storage::{StorageError, with_timeout};

/// 列出目标文件夹中已上传的文件
///
/// 文件夹不存在时返回 `No uploads yet.`，否则每行一个文件名。
/// 不分页，也不包含大小或时间等元数据。
pub async fn handle_files(State(state): State<AppState>) -> Response {
    let names = match list_uploads(&state).await {
        Ok(Some(names)) => names,
        Ok(None) => return Html(NO_UPLOADS_MESSAGE).into_response(),
        Err(e) => {
            error!(error = %e, "failed to list uploaded files");
            return (StatusCode::INTERNAL_SERVER_ERROR, LIST_ERROR_MESSAGE).into_response();
        }
    };

    let listing = FileListTemplate {
        folder: &state.config.upload_folder,
        names: &names,
    };
    match listing.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render file listing");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
        }
    }
}

async fn list_uploads(state: &AppState) -> Result<Option<Vec<String>>, StorageError> {
    let timeout = state.config.storage_timeout;
    let session = state.sessions.acquire().await?;

    let Some(folder) = with_timeout(
        "find folder",
        timeout,
        session.find_folder(&state.config.upload_folder),
    )
    .await?
    else {
        return Ok(None);
    };

    let names = with_timeout("list folder", timeout, session.list(&folder)).await?;
    Ok(Some(names))
}
