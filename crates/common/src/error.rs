use thiserror::Error;

/// Every failure the herald can report.
///
/// `MissingCredentials` and `Config` are startup errors and end the process.
/// All other variants are scoped to a single poll iteration: they are logged
/// at the iteration boundary and the loop carries on at its next tick.
#[derive(Debug, Error)]
pub enum HeraldError {
    #[error("Missing required environment variables: {}", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Status API request failed ({endpoint}, from_date={from_date}): {source}")]
    Transport {
        endpoint: String,
        from_date: i64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Status API answered {status}: {reason} ({endpoint}, from_date={from_date})")]
    ApiStatus {
        status: u16,
        reason: &'static str,
        endpoint: String,
        from_date: i64,
    },

    #[error("Status API returned a body that is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    #[error("Missing or invalid field in review record: {0}")]
    MissingField(String),

    #[error("Failed to deliver message to chat {chat_id}: {reason}")]
    Delivery { chat_id: String, reason: String },
}

impl HeraldError {
    /// Stable label used as the `kind` field in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            HeraldError::MissingCredentials { .. } => "missing_credentials",
            HeraldError::Config(_) => "config",
            HeraldError::Transport { .. } => "transport",
            HeraldError::ApiStatus { .. } => "api_status",
            HeraldError::MalformedBody(_) => "malformed_body",
            HeraldError::ResponseShape(_) => "response_shape",
            HeraldError::MissingField(_) => "missing_field",
            HeraldError::Delivery { .. } => "delivery",
        }
    }

    /// Whether the same request could succeed on a later tick without any
    /// change to configuration or upstream data.
    pub fn is_retriable(&self) -> bool {
        match self {
            HeraldError::Transport { .. } => true,
            HeraldError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Startup errors are the only ones allowed to stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HeraldError::MissingCredentials { .. } | HeraldError::Config(_)
        )
    }
}
