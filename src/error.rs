use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum TalkError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("No input")]
    NoInput { received: Value },

    #[error("OpenAI error: {status}")]
    Upstream { status: u16, detail: String },

    #[error("Bad JSON from OpenAI")]
    BadUpstreamJson { raw: String },

    #[error("Payload Too Large")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Internal(String),
}

impl ResponseError for TalkError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NoInput { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::BadUpstreamJson { .. } => StatusCode::BAD_GATEWAY,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Http(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::MissingApiKey | Self::MethodNotAllowed => json!({ "error": self.to_string() }),
            Self::NoInput { received } => json!({ "error": "No input", "received": received }),
            Self::Upstream { status, detail } => json!({
                "error": "OpenAI error",
                "status": status,
                "detail": detail,
            }),
            Self::BadUpstreamJson { raw } => json!({ "error": "Bad JSON from OpenAI", "raw": raw }),
            Self::PayloadTooLarge { limit } => json!({ "error": self.to_string(), "limit": limit }),
            Self::Http(_) | Self::Internal(_) => {
                error!("[talk] {}", self);
                json!({ "error": "Server error", "detail": self.to_string() })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
