use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::AppState;
use crate::handlers::constants::STORAGE_SESSION_HEADER;

/// 健康检查
///
/// 不会触发存储端认证，只报告会话是否已经建立。
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let session = if state.sessions.is_connected() {
        "connected"
    } else {
        "pending"
    };

    (StatusCode::OK, [(STORAGE_SESSION_HEADER, session)], "ok")
}
