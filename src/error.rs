use actix_web::{HttpResponse, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

/// Failure taxonomy of the core stores. Handlers either match on these or
/// bubble them up with `?`; the `ResponseError` impl below turns them into
/// the JSON bodies the UI expects.
#[derive(Debug, Display, Error)]
pub enum EmsError {
    #[display(fmt = "Email already exists")]
    DuplicateEmail,

    #[display(fmt = "Invalid credentials")]
    InvalidCredentials,

    #[display(fmt = "Not found")]
    NotFound,

    /// A time-off request that already left `pending` cannot be re-decided.
    #[display(fmt = "Request already processed")]
    AlreadyDecided,

    #[display(fmt = "start_date cannot be after end_date")]
    InvalidDateRange,

    #[display(fmt = "Storage failure: {}", _0)]
    Persistence(#[error(not(source))] String),
}

impl actix_web::ResponseError for EmsError {
    fn status_code(&self) -> StatusCode {
        match self {
            EmsError::DuplicateEmail => StatusCode::CONFLICT,
            EmsError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            EmsError::NotFound => StatusCode::NOT_FOUND,
            EmsError::AlreadyDecided | EmsError::InvalidDateRange => StatusCode::BAD_REQUEST,
            EmsError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let EmsError::Persistence(detail) = self {
            tracing::error!(error = %detail, "Storage failure surfaced to handler");
            // Do not leak filesystem details to the caller.
            return HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}
