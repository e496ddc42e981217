use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failures of the remote classifier round trip.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("could not re-encode image as PNG: {0}")]
    Image(#[from] image::ImageError),
    #[error("image encoding task failed: {0}")]
    Encoding(#[from] tokio::task::JoinError),
    #[error("Prediction API Error: {0}")]
    Status(u16),
    #[error("API Error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API Error: response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API Error: {0}")]
    Malformed(&'static str),
}

/// Failures of the language-model report request.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("report API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("report response did not contain any message content")]
    MissingContent,
}

/// Rejected form submissions. Nothing is sent upstream when one of these
/// is raised.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("missing form field: {0}")]
    MissingField(&'static str),
    #[error("age must be a whole number between 1 and 120, got {0:?}")]
    InvalidAge(String),
    #[error("unsupported sex value: {0:?}")]
    InvalidSex(String),
    #[error("uploaded image is empty")]
    EmptyImage,
    #[error("uploaded file is not a PNG or JPEG image")]
    UnsupportedImage,
    #[error("malformed upload: {0}")]
    Multipart(String),
}

impl ResponseError for FormError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_like_ui_message() {
        assert_eq!(PredictError::Status(500).to_string(), "Prediction API Error: 500");
    }

    #[test]
    fn form_errors_are_bad_requests() {
        let err = FormError::InvalidAge("0".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }
}
