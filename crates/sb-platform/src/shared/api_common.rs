//! Common API types and utilities

use axum::extract::FromRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::shared::error::PlatformError;

/// JSON body extractor whose rejections become `PlatformError::Validation`,
/// so malformed bodies still get the standard error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(PlatformError))]
pub struct ApiJson<T>(pub T);

/// Plain acknowledgement body
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
