use errors::IdentityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigFileError),
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors)
}

impl SyncError {
    pub fn identity(&self) -> Option<&IdentityError> {
        match self {
            Self::Identity(err) => Some(err),
            _ => None
        }
    }

    /// True for the conditions that mean two items claim one identity.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self.identity(),
            Some(
                IdentityError::DuplicateIdentity { .. }
                    | IdentityError::ProbableDuplicateItem { .. }
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
