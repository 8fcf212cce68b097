//! OrderSync error type.

/// Errors surfaced by any OrderSync crate.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid cron expression {0}")]
    InvalidSchedule(String),

    #[error("Orders API error: {0}")]
    Orders(String),

    /// Non-2xx reply from the chat webhook.
    #[error("Failed to send message to Cliq: {status}; {body}")]
    Webhook { status: String, body: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_error_carries_status_and_body() {
        let err = SyncError::Webhook {
            status: "Internal Server Error".into(),
            body: "{\"message\":\"down\"}".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to send message to Cliq: Internal Server Error; {\"message\":\"down\"}"
        );
    }
}
