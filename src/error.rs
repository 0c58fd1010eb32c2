//! Error types for query resolution

use thiserror::Error;

/// Failure of a single inventory capability call
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The service answered with a non-success status
    #[error("{operation} failed with status {status}")]
    Status { operation: String, status: u16 },

    /// The request never produced a response (connect, TLS, timeout)
    #[error("{operation} transport error: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape
    #[error("{operation} returned an unreadable response: {message}")]
    Decode { operation: String, message: String },
}

impl UpstreamError {
    pub fn status(operation: &str, status: u16) -> Self {
        Self::Status {
            operation: operation.to_string(),
            status,
        }
    }

    pub fn transport(operation: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn decode(operation: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of the failed call, when the service answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }
}

/// Error returned by [`crate::Resolver::resolve`]
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Missing or malformed query parameter, raised before any external call
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The query type tag names no known routine
    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(String),

    /// An inventory capability call failed
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    /// An inventory capability call failed while populating the enumeration cache
    #[error("cache fetch for {region}/{namespace} failed: {source}")]
    CacheFetch {
        region: String,
        namespace: String,
        #[source]
        source: UpstreamError,
    },
}

impl ResolveError {
    pub fn missing(name: &str) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: "missing required parameter".to_string(),
        }
    }

    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the caller sent a bad query, false when a service failed
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::UnsupportedQueryType(_)
        )
    }

    fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            Self::Upstream(e) => Some(e),
            Self::CacheFetch { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Format the error for display to an end user
    /// Security: upstream failures are reduced to generic messages so API details do not leak
    pub fn user_message(&self) -> String {
        let Some(upstream) = self.upstream() else {
            return self.to_string();
        };

        match upstream.status_code() {
            Some(401) => "Authentication failed. Check the datasource credentials.".to_string(),
            Some(403) => "Permission denied. Check the datasource IAM permissions.".to_string(),
            Some(404) => "Resource not found.".to_string(),
            Some(400) => "Invalid request. Check your parameters.".to_string(),
            Some(429) => "Rate limit exceeded. Please try again later.".to_string(),
            Some(s) if s >= 500 => {
                "Service temporarily unavailable. Please try again.".to_string()
            }
            _ => "Request failed. Check your network connection and try again.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
