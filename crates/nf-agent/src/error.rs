//! Agent error types

use thiserror::Error;

/// Errors talking to the coordinator through the tunnel
#[derive(Error, Debug)]
pub enum AgentError {
    /// Nothing answered on the tunnel port
    #[error(
        "Error connecting to server at {url}. Make sure you have your tunnel open \
         and server running before running this command."
    )]
    ConnectionUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Something answered, but not with a 200
    #[error("Error, result was not successful: {url} returned status {status}")]
    UnexpectedResponse { url: String, status: u16 },

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl AgentError {
    /// Whether the tunnel or listener is down, as opposed to misbehaving
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AgentError::ConnectionUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_response_message() {
        let err = AgentError::UnexpectedResponse {
            url: "http://localhost:10934/notificate".to_string(),
            status: 500,
        };
        assert!(err.to_string().contains("500"));
        assert!(!err.is_unavailable());
    }
}
