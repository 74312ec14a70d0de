use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use recovery_wallet_core::{ErrorKind, RecoveryError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request-boundary wrapper around the core error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(pub RecoveryError);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub timestamp: String,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Configuration | ErrorKind::SecretParse | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Insufficient => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::ContractRevert => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Rpc => StatusCode::BAD_GATEWAY,
        ErrorKind::ConfirmationUnknown => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: ErrorBody {
                kind: self.kind(),
                message: self.0.to_string(),
                tx_hash: self.0.tx_hash().map(str::to_string),
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecoveryError> for ApiError {
    fn from(err: RecoveryError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
