//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 (含内容文档可读性) | 无 |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "environment": "production", "document": "ok" }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    environment: String,
    /// 内容文档状态: ok | error
    document: &'static str,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let document = match state.content.document().await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e.message, "Content document unreadable");
            "error"
        }
    };

    Json(HealthResponse {
        status: if document == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        document,
    })
}
