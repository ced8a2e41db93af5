//! Content API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/content | GET | 完整内容文档 | 无 |
//! | /api/content/{section} | GET | 单个 section | 无 |
//! | /api/content/save | POST | 保存 section | 管理员 + CSRF |
//! | /api/content/migrate | POST | 旧 quantity 迁移 | 管理员 + CSRF |
//!
//! 其他方法返回 405 (JSON 错误体)，先于认证检查。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/content", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let admin = || middleware::from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .route(
            "/",
            get(handler::get_document).fallback(handler::method_not_allowed),
        )
        .route(
            "/save",
            post(handler::save)
                .route_layer(admin())
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/migrate",
            post(handler::migrate)
                .route_layer(admin())
                .fallback(handler::method_not_allowed),
        )
        .route(
            "/{section}",
            get(handler::get_section).fallback(handler::method_not_allowed),
        )
}
