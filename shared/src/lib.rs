//! Shared types for the content service
//!
//! Types used by both the server and its clients (admin editor bindings,
//! tests): the content document model, the save request/response wire
//! format, and the unified error system.

pub mod content;
pub mod error;
pub mod request;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use content::{ContentDocument, Payload, PayloadKind, QuantityOption};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use request::SaveRequest;
