use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ControlError {
    #[error("Device backend unreachable: {0}")]
    Transport(String),

    #[error("Device backend rejected {endpoint} request with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed response payload: {0}")]
    MalformedPayload(String),

    #[error("Another control operation is still in progress")]
    Busy,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ControlError {
    /// True for every failure of a remote call (network, non-success
    /// status, undecodable payload).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ControlError::Transport(_)
                | ControlError::Status { .. }
                | ControlError::MalformedPayload(_)
        )
    }
}

impl From<reqwest::Error> for ControlError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ControlError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            ControlError::Status {
                endpoint: err
                    .url()
                    .map(|url| url.path().to_string())
                    .unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            ControlError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        ControlError::MalformedPayload(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
