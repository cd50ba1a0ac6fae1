//! JSON body extractor whose rejections use the `ErrorResponse` envelope

use crate::error::ApiError;
use axum::extract::FromRequest;

/// `axum::Json` with rejections converted into `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
