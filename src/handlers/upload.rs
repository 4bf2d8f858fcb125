use askama::Template;
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::AppState;
use crate::handlers::constants::{FILE_FIELD, INTERNAL_ERROR_MESSAGE, NO_FILE_MESSAGE};
use crate::handlers::templates::{UploadFailedTemplate, UploadedTemplate};
use crate::storage::{StorageError, with_timeout};
use crate::utils::path::guess_content_type;
use crate::utils::temp_file::TempUpload;

/// 上传处理错误
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file uploaded")]
    NoFile,

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// 存储端拒绝了文件上传
    #[error("upload failed: {0}")]
    Transfer(StorageError),

    /// 会话、文件夹或本地 I/O 等其它失败
    #[error("internal error: {0}")]
    Internal(StorageError),

    #[error("failed to render response: {0}")]
    Render(#[from] askama::Error),
}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::Internal(StorageError::Io(e))
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::NoFile => (StatusCode::BAD_REQUEST, NO_FILE_MESSAGE).into_response(),
            UploadError::Multipart(e) => {
                warn!(error = %e, "rejected multipart upload");
                (e.status(), e.body_text()).into_response()
            }
            UploadError::Transfer(e) => {
                error!(error = %e, "storage upload failed");
                let message = e.to_string();
                match (UploadFailedTemplate { message: &message }).render() {
                    Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
                    Err(e) => UploadError::Render(e).into_response(),
                }
            }
            UploadError::Internal(e) => {
                error!(error = %e, "upload request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
            }
            UploadError::Render(e) => {
                error!(error = %e, "failed to render upload response");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
            }
        }
    }
}

/// 处理文件上传
///
/// 从 `authfile` 字段读取文件写入临时目录，确保目标文件夹存在后上传到存储端。
/// 无论成功还是失败，临时文件都会在响应前删除。
///
/// # 返回值
///
/// * `Ok(Html)` - 包含文件名与文件夹名的成功提示
/// * `Err(UploadError)` - 400（未附带文件）或 500（上传失败或内部错误）
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, UploadError> {
    let Some(mut upload) = receive_file(&mut multipart, &state.config.tmp_dir).await? else {
        return Err(UploadError::NoFile);
    };

    let result = match upload.finish().await {
        Ok(()) => relay(&state, &upload).await,
        Err(e) => Err(e.into()),
    };

    let file_name = upload.file_name().to_string();
    let path = upload.path().to_path_buf();
    if let Err(e) = upload.remove() {
        warn!(path = %path.display(), error = %e, "failed to remove temp file");
    }

    let key = result?;
    info!(key = %key, "upload stored");
    let page = UploadedTemplate {
        file_name: &file_name,
        folder: &state.config.upload_folder,
    };
    Ok(Html(page.render()?))
}

/// 从表单中取出文件字段并写入临时文件
///
/// 其它字段以及文件名为空的字段会被忽略；只取第一个文件。
async fn receive_file(
    multipart: &mut Multipart,
    tmp_dir: &Path,
) -> Result<Option<TempUpload>, UploadError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let mut upload = TempUpload::create_in(tmp_dir, original_name)?;
        while let Some(chunk) = field.chunk().await? {
            upload.write_chunk(&chunk).await?;
        }

        info!(
            file = upload.original_name(),
            size = upload.size(),
            "received upload"
        );
        return Ok(Some(upload));
    }

    Ok(None)
}

/// 获取会话、确保文件夹存在并上传文件，返回存储端对象键
async fn relay(state: &AppState, upload: &TempUpload) -> Result<String, UploadError> {
    let timeout = state.config.storage_timeout;

    let session = state.sessions.acquire().await.map_err(UploadError::Internal)?;
    let folder = state
        .folders
        .ensure_folder(session.as_ref(), &state.config.upload_folder, timeout)
        .await
        .map_err(UploadError::Internal)?;

    let file_name = upload.file_name();
    let content_type = guess_content_type(file_name);
    with_timeout(
        "upload",
        timeout,
        session.upload(&folder, file_name, upload.path(), &content_type),
    )
    .await
    .map_err(upload_failure)
}

/// 本地读取临时文件失败属于内部错误，其余错误来自存储端
fn upload_failure(e: StorageError) -> UploadError {
    match e {
        StorageError::Io(_) => UploadError::Internal(e),
        e => UploadError::Transfer(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_no_file_is_bad_request() {
        let response = UploadError::NoFile.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, NO_FILE_MESSAGE);
    }

    #[tokio::test]
    async fn test_transfer_error_includes_provider_message() {
        let response =
            UploadError::Transfer(StorageError::Provider("quota <exceeded>".to_string()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "Upload failed: quota &lt;exceeded&gt;"
        );
    }

    #[tokio::test]
    async fn test_local_io_failure_during_upload_is_internal() {
        let err = upload_failure(StorageError::Io(std::io::Error::other("temp file vanished")));
        assert!(matches!(err, UploadError::Internal(StorageError::Io(_))));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_provider_failure_during_upload_is_transfer() {
        let err = upload_failure(StorageError::Provider("quota exceeded".to_string()));
        assert!(matches!(err, UploadError::Transfer(StorageError::Provider(_))));
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let response =
            UploadError::Internal(StorageError::Authentication("bad password".to_string()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert_eq!(body, INTERNAL_ERROR_MESSAGE);
        assert!(!body.contains("bad password"));
    }
}
