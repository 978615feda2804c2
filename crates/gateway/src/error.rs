use railrefund_core::{ApplicationError, DomainError};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway.api_key is not configured (set RAILREFUND_GATEWAY_API_KEY or RAPIDAPI_KEY)")]
    MissingApiKey,
    #[error("could not build upstream http client: {0}")]
    Client(String),
    #[error("upstream request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("upstream transport failure: {0}")]
    Transport(String),
    #[error("upstream responded with http status {status}")]
    Status { status: u16 },
    /// 4xx response whose body explained the refusal (e.g. an unsubscribed key).
    #[error("upstream refused the request with http status {status}: {message}")]
    Refused { status: u16, message: String },
    #[error("upstream rejected the lookup: {0}")]
    Rejected(String),
    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
    #[error(transparent)]
    Normalize(#[from] DomainError),
}

impl GatewayError {
    /// Transport hiccups, timeouts and upstream 5xx responses are worth one
    /// more attempt; everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Status { status } => *status >= 500,
            _ => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "Failed to fetch PNR details. Please try again.",
            Self::Normalize(DomainError::InvalidPnr(_)) => {
                "The PNR number must be exactly 10 digits."
            }
            Self::Normalize(_) => "The PNR details returned by the provider could not be read.",
            _ => "An error occurred while fetching PNR details.",
        }
    }
}

impl From<GatewayError> for ApplicationError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::Normalize(error) => Self::Domain(error),
            GatewayError::MissingApiKey | GatewayError::Client(_) => {
                Self::Configuration(value.to_string())
            }
            other => Self::Integration(other.to_string()),
        }
    }
}
