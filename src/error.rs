//! Error taxonomy for ledger requests.
//!
//! # Taxonomy
//! ```text
//! Connectivity   no HTTP response at all              retried, short budget
//! Protocol       NoRequestId (missing correlation)    retried, short budget
//!                Json (unparsable body)               never retried
//! Backend        NotFound / BadRequest / Server       retried only when the body says retriable
//! Validation     InvalidParameters (local)            never retried
//! ```
//!
//! Every variant renders as `<Kind>: <message> [Request-ID: <id>]` so a log
//! line can be correlated with backend diagnostics.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Message the backend uses when the per-credential request rate is exceeded.
pub const RATE_LIMIT_MESSAGE: &str = "Request limit exceeded";

/// Closed classification of [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connectivity,
    NoRequestId,
    Json,
    NotFound,
    BadRequest,
    Server,
    InvalidParameters,
    Configuration,
}

impl ErrorKind {
    /// Stable name used in rendered messages.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Connectivity => "ConnectivityError",
            ErrorKind::NoRequestId => "NoRequestIdError",
            ErrorKind::Json => "JsonError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::BadRequest => "BadRequestError",
            ErrorKind::Server => "ServerError",
            ErrorKind::InvalidParameters => "InvalidParametersError",
            ErrorKind::Configuration => "ConfigurationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured body of a non-2xx ledger response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: u16,
    /// Machine-readable error code (`seqCode`, or `code` on older backends).
    pub code: Option<String>,
    /// Human-readable message as sent by the backend.
    pub message: String,
    /// Optional extra detail.
    pub detail: Option<String>,
    /// Value of the `Chain-Request-Id` response header.
    pub request_id: Option<String>,
    /// Whether the backend flagged the failure as retriable.
    pub retriable: bool,
    /// Nested structured data (per-action failures for transactions).
    pub data: Option<Value>,
}

/// One failing action inside an aggregate transaction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    /// Position of the action in the submitted action list.
    pub index: usize,
    pub code: Option<String>,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    /// Build from a response body that has already been camelized.
    pub fn from_body(status: u16, request_id: Option<String>, body: &Value) -> Self {
        Self {
            status,
            code: string_field(body, "seqCode").or_else(|| string_field(body, "code")),
            message: string_field(body, "message").unwrap_or_default(),
            detail: string_field(body, "detail"),
            request_id,
            retriable: body.get("retriable").and_then(Value::as_bool).unwrap_or(false),
            data: body.get("data").filter(|d| !d.is_null()).cloned(),
        }
    }

    /// Per-action failures carried by an aggregate transaction error.
    ///
    /// Empty when the error is not about individual actions.
    pub fn action_errors(&self) -> Vec<ActionFailure> {
        let Some(actions) = self
            .data
            .as_ref()
            .and_then(|d| d.get("actions"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        actions
            .iter()
            .enumerate()
            .map(|(position, action)| ActionFailure {
                index: action
                    .get("data")
                    .and_then(|d| d.get("index"))
                    .and_then(Value::as_u64)
                    .map(|i| i as usize)
                    .unwrap_or(position),
                code: string_field(action, "seqCode").or_else(|| string_field(action, "code")),
                message: string_field(action, "message").unwrap_or_default(),
                detail: string_field(action, "detail"),
            })
            .collect()
    }

    fn is_rate_limited(&self) -> bool {
        self.message == RATE_LIMIT_MESSAGE
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code.as_deref().filter(|c| !c.is_empty()) {
            write!(f, "Code: {} ", code)?;
        }
        write!(f, "Message: {}", self.message)?;
        if let Some(detail) = self.detail.as_deref().filter(|d| !d.is_empty()) {
            write!(f, " Detail: {}", detail)?;
        }
        Ok(())
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Errors surfaced by the ledger client.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Connectivity {
        /// Client-generated id of the logical request.
        request_id: String,
        #[source]
        source: reqwest::Error,
    },

    /// No response arrived before the retry budget ran out.
    Timeout {
        /// Client-generated id of the logical request.
        request_id: String,
        /// Time spent since the first attempt started.
        after: Duration,
    },

    /// A response arrived without the `Chain-Request-Id` header.
    NoRequestId { status: u16 },

    /// The response body was not valid JSON.
    Json {
        status: u16,
        request_id: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 404.
    NotFound(ApiError),

    /// Any other non-2xx, non-5xx status.
    BadRequest(ApiError),

    /// HTTP 5xx.
    Server(ApiError),

    /// Local validation failed before any request was sent.
    InvalidParameters { message: String },

    /// The client configuration is unusable.
    Configuration { message: String },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map a non-2xx status and its (camelized) body onto the taxonomy.
    pub fn classify(status: u16, request_id: Option<String>, body: &Value) -> Self {
        let api = ApiError::from_body(status, request_id, body);
        match status {
            404 => Error::NotFound(api),
            500..=599 => Error::Server(api),
            _ => Error::BadRequest(api),
        }
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Error::InvalidParameters {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connectivity { .. } | Error::Timeout { .. } => ErrorKind::Connectivity,
            Error::NoRequestId { .. } => ErrorKind::NoRequestId,
            Error::Json { .. } => ErrorKind::Json,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::Server(_) => ErrorKind::Server,
            Error::InvalidParameters { .. } => ErrorKind::InvalidParameters,
            Error::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// The backend error body, for the HTTP-status-driven kinds.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::NotFound(api) | Error::BadRequest(api) | Error::Server(api) => Some(api),
            _ => None,
        }
    }

    /// Correlation id: the backend's for API errors, the client's otherwise.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Connectivity { request_id, .. } | Error::Timeout { request_id, .. } => {
                Some(request_id)
            }
            Error::Json { request_id, .. } => request_id.as_deref(),
            Error::NotFound(api) | Error::BadRequest(api) | Error::Server(api) => {
                api.request_id.as_deref()
            }
            _ => None,
        }
    }

    /// Machine error code, when the backend supplied one.
    pub fn code(&self) -> Option<&str> {
        self.api_error().and_then(|api| api.code.as_deref())
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NoRequestId { status } | Error::Json { status, .. } => Some(*status),
            Error::NotFound(api) | Error::BadRequest(api) | Error::Server(api) => Some(api.status),
            _ => None,
        }
    }

    /// Whether the backend asked for this failure to be retried.
    ///
    /// Rate-limit rejections count as retriable even without the flag.
    pub fn is_backend_retriable(&self) -> bool {
        self.api_error()
            .map(|api| api.retriable || api.is_rate_limited())
            .unwrap_or(false)
    }

    /// Human message without the kind prefix or request id.
    pub fn message(&self) -> String {
        match self {
            Error::Connectivity { source, .. } => format!("Fetch error: {}", source),
            Error::Timeout { after, .. } => {
                format!("Fetch error: no response after {}ms", after.as_millis())
            }
            Error::NoRequestId { .. } => "Chain-Request-Id header is missing. There may be an \
                                          issue with your proxy or network configuration."
                .to_string(),
            Error::Json { .. } => "Could not parse JSON response".to_string(),
            Error::NotFound(api) | Error::BadRequest(api) | Error::Server(api) => api.to_string(),
            Error::InvalidParameters { message } | Error::Configuration { message } => {
                message.clone()
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())?;
        if let Some(id) = self.request_id() {
            write!(f, " [Request-ID: {}]", id)?;
        }
        Ok(())
    }
}
