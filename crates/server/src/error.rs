use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use faqseek_common::FaqSeekError;
use std::fmt;
use tracing::{error, warn};

use crate::types::ErrorResponse;

/// HTTP wrapper for [`FaqSeekError`]
#[derive(Debug)]
pub struct ApiError(pub FaqSeekError);

impl From<FaqSeekError> for ApiError {
    fn from(err: FaqSeekError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if self.0.is_recoverable() {
            warn!("Request failed: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.0.to_string(),
        })
    }
}
