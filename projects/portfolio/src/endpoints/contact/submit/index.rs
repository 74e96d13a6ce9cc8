use axum::{
    body::Bytes,
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::{models::ContactSubmission, state::AppState, utils::contact_sink::ContactSink};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_MESSAGE_LEN: usize = 10;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("DeserializeRequestBody: {source}")]
    DeserializeRequestBody {
        #[from]
        source: serde_json::Error,
    },
    #[error("Invalid input")]
    InvalidInput,
    #[error("RecordSubmission: {source}")]
    RecordSubmission {
        source: anyhow::Error,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidInput => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid input" }))).into_response()
            }
            err => {
                error!(error = %err, "Contact API error");
                let body = Json(json!({ "error": "Server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum SubmissionOutcome {
    Recorded,
    /// Honeypot field was filled in. Nothing was validated or recorded.
    Deflected,
}

/// Axum handler: POST /api/contact
pub async fn handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Json<Value>, HandlerError> {
    process_submission(&body, state.contact_sink.as_ref()).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn process_submission(
    body: &[u8],
    sink: &dyn ContactSink,
) -> Result<SubmissionOutcome, HandlerError> {
    let body: Value = serde_json::from_slice(body)?;

    if is_honeypot_filled(&body) {
        debug!("Contact honeypot tripped");
        return Ok(SubmissionOutcome::Deflected);
    }

    let submission = validate(&body).ok_or(HandlerError::InvalidInput)?;

    sink.record(&submission)
        .await
        .map_err(|source| HandlerError::RecordSubmission { source })?;

    Ok(SubmissionOutcome::Recorded)
}

fn is_honeypot_filled(body: &Value) -> bool {
    body.get("company")
        .and_then(Value::as_str)
        .is_some_and(|company| !company.trim().is_empty())
}

fn validate(body: &Value) -> Option<ContactSubmission> {
    let field = |key: &str| body.get(key).and_then(Value::as_str);

    let name = field("name")?;
    let email = field("email")?;
    let message = field("message")?;

    let valid = name.chars().count() >= MIN_NAME_LEN
        && EMAIL.is_match(email)
        && message.chars().count() >= MIN_MESSAGE_LEN;

    valid.then(|| ContactSubmission {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}
