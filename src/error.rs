use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use mongodb::bson::Bson;
use thiserror::Error;

use crate::dto::ErrorResponse;

/// Failures coming out of the data access layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
    #[error("inserted id is not an ObjectId: {0}")]
    UnexpectedId(Bson),
}

/// Errors a handler turns into a response. The messages are the response
/// bodies, so they never carry storage details.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please provide a body")]
    MissingText,
    #[error("Invalid ID")]
    InvalidId,
    #[error("Todo not found")]
    NotFound,
    #[error("Could not fetch todos")]
    Fetch,
    #[error("Could not create todo")]
    Create,
    #[error("Could not update todo")]
    Update,
    #[error("Could not delete todo")]
    Delete,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingText | ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Fetch | ApiError::Create | ApiError::Update | ApiError::Delete => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
