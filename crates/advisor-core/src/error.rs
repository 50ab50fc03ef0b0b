//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    /// Missing or empty user input.
    #[error("VALIDATION/{0}")]
    Validation(String),

    /// Unresolvable operation identifier (carries the operation name).
    #[error("NOTFOUND/{0}")]
    NotFound(String),

    /// A resolved operation ran and signaled failure.
    #[error("OPERATION/{0}")]
    Operation(String),

    /// Cloud, memory or model failure.
    #[error("COLLABORATOR/{0}")]
    Collaborator(String),

    /// No tenant/subscription match at the cloud provider.
    #[error("TENANT/{0}")]
    Tenant(String),

    #[error("CONFIG/{0}")]
    Config(String),
}

impl AdvisorError {
    /// The message as it should reach the caller, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(name) => format!("Function {} not found", name),
            Self::Validation(msg)
            | Self::Operation(msg)
            | Self::Collaborator(msg)
            | Self::Tenant(msg)
            | Self::Config(msg) => msg.clone(),
        }
    }
}
