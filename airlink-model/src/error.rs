use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug)]
pub enum ModelError {
    EmptySsid,
    CredentialMismatch {
        security: &'static str,
        has_credential: bool,
    },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptySsid => write!(f, "ssid must not be empty"),
            ModelError::CredentialMismatch {
                security,
                has_credential: true,
            } => {
                write!(f, "{security} networks do not take a credential")
            }
            ModelError::CredentialMismatch {
                security,
                has_credential: false,
            } => {
                write!(f, "{security} networks require a credential")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
