use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Errors surfaced by the ledger core. None of these are fatal to the
/// process: a failing trade or market is logged and the rest of the batch
/// continues.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed feed record — logged and skipped, the batch continues.
    #[error("invalid trade record: {0}")]
    Validation(String),

    /// Optimistic write conflict that survived all local retries. The trade
    /// may be resubmitted; idempotency makes the retry harmless.
    #[error("ledger unavailable for key {key} after {attempts} attempts")]
    LedgerUnavailable { key: String, attempts: u32 },

    /// A resolution fact named a winner that no known outcome of the market
    /// matches. Settlement for that market is refused; positions stay open.
    #[error("market {market_id} resolution names unknown outcome '{outcome}'")]
    ResolutionInconsistent { market_id: String, outcome: String },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl LedgerError {
    /// True when the underlying database error is a serialization failure,
    /// deadlock, or unique-key race that a fresh transaction can win.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Db(sqlx::Error::Database(db_err)) => matches!(
                db_err.code().as_deref(),
                Some("40001") | Some("40P01") | Some("23505")
            ),
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}
