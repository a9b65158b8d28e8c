use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pricekeeper_core::errors::Error as CoreError;
use thiserror::Error;

use crate::api::json_reply;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Validation and existence-check outcomes are regular replies.
            ApiError::Core(CoreError::Price(e)) => json_reply(StatusCode::OK, &e.to_string()),
            ApiError::Core(e) => {
                tracing::error!("Request failed: {}", e);
                json_reply(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
