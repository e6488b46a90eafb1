use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use thiserror::Error;
use topup_engine::{CatalogError, CheckoutError, ErrorKind, ReconcileError, StoreError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("Could not read query parameters: {0}")]
    InvalidQuery(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
    #[error("{0}")]
    Reconcile(#[from] ReconcileError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    /// The engine's classification of the failure, if it came from the engine.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Checkout(e) => Some(e.kind()),
            Self::Reconcile(e) => Some(e.kind()),
            Self::Catalog(e) => Some(e.kind()),
            Self::Store(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// The machine-readable `reason` code that accompanies every error response.
    pub fn reason(&self) -> String {
        if let Some(kind) = self.kind() {
            return kind.to_string();
        }
        match self {
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) | Self::InvalidQuery(_) => {
                ErrorKind::Validation.to_string()
            },
            Self::InsufficientPermissions(_) => "forbidden".to_string(),
            _ => "internal".to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        if let Some(kind) = self.kind() {
            return match kind {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Unavailable => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Gateway => StatusCode::BAD_GATEWAY,
                ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Desynchronized => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {status}: {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string(), "reason": self.reason() }).to_string())
    }
}
