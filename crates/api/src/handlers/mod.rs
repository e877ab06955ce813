pub mod action;
pub mod metrics;

pub use action::dispatch_handler;
pub use metrics::metrics_handler;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use endpoint_relay_domain::error::RelayError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Relay(err) => match err {
                RelayError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
                RelayError::NoEndpointForEnvironment { .. } => StatusCode::NOT_FOUND,
                RelayError::ConfigNotFound { .. }
                | RelayError::ConfigValueMissing { .. }
                | RelayError::MalformedConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
                RelayError::RecordStore { .. } => StatusCode::SERVICE_UNAVAILABLE,
                RelayError::Transport(_) | RelayError::RequestFailed { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
