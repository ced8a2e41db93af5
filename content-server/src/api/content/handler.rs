//! Content API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path, State},
};
use http::{HeaderMap, header};
use serde::Deserialize;
use serde_json::Value;
use shared::{ApiResponse, AppError, AppResult, ContentDocument, ErrorCode, SaveRequest};

use crate::auth::{AdminSession, csrf};
use crate::content::MigrationReport;
use crate::core::ServerState;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// GET /api/content - 完整内容文档
pub async fn get_document(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<ContentDocument>>> {
    let document = state.content.document().await?;
    Ok(Json(ApiResponse::success("Content loaded", document)))
}

/// GET /api/content/{section} - 单个 section
pub async fn get_section(
    State(state): State<ServerState>,
    Path(section): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let mut document = state.content.document().await?.into_map();
    let value = document
        .shift_remove(&section)
        .ok_or_else(|| AppError::not_found(format!("Section {}", section)))?;
    Ok(Json(ApiResponse::success("Section loaded", value)))
}

/// POST /api/content/save - 保存 section
///
/// 检查顺序: 会话 (中间件) → 请求体 → CSRF → section/content → 合并校验 → 写入
pub async fn save(
    State(state): State<ServerState>,
    Extension(session): Extension<AdminSession>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<ApiResponse<()>> {
    let request = decode_save_request(&headers, &body)?;

    let provided = request.csrf_token.as_deref().or(csrf::header_token(&headers));
    csrf::verify(&session, provided)?;

    let section = request
        .section
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::SectionRequired, "Missing section")
                .with_detail("field", "section")
        })?;
    let content = request.content.ok_or_else(|| {
        AppError::with_message(ErrorCode::ContentRequired, "Missing content")
            .with_detail("field", "content")
    })?;

    let outcome = state.content.save_section(&section, content).await?;

    tracing::info!(
        target: "http_access",
        username = %session.username,
        section = %outcome.section,
        "Section saved"
    );
    Ok(ApiResponse::ok("Content saved successfully").with_timestamp(outcome.timestamp))
}

/// Optional body of the migrate call
#[derive(Debug, Default, Deserialize)]
struct MigrateRequest {
    #[serde(default)]
    csrf_token: Option<String>,
}

/// POST /api/content/migrate - 旧 quantity 迁移
pub async fn migrate(
    State(state): State<ServerState>,
    Extension(session): Extension<AdminSession>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<ApiResponse<MigrationReport>> {
    let request: MigrateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        MigrateRequest::default()
    } else if is_form(&headers) {
        serde_urlencoded::from_bytes(&body)
            .map_err(|e| AppError::invalid_format(format!("Invalid form body: {e}")))?
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::invalid_format(format!("Invalid JSON body: {e}")))?
    };

    let provided = request.csrf_token.as_deref().or(csrf::header_token(&headers));
    csrf::verify(&session, provided)?;

    let outcome = state.content.migrate().await?;
    let message = if outcome.timestamp.is_some() {
        "Migration complete"
    } else {
        "Nothing to migrate"
    };

    let response = ApiResponse::success(message, outcome.report);
    Ok(match outcome.timestamp {
        Some(timestamp) => response.with_timestamp(timestamp),
        None => response,
    })
}

/// 非法方法 - 405
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
}

/// JSON 请求体，或旧版表单 (除 section/csrf_token 外的字段汇总为 content)
fn decode_save_request(headers: &HeaderMap, body: &[u8]) -> AppResult<SaveRequest> {
    if is_form(headers) {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::invalid_format(format!("Invalid form body: {e}")))?;
        return Ok(SaveRequest::from_form_fields(fields));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::invalid_format("Request body is empty"));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_format(format!("Invalid JSON body: {e}")))
}
