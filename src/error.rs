use thiserror::Error;

/// Error taxonomy for the fleet core.
///
/// Callers can discriminate failure causes instead of guessing from a
/// sentinel: a validation rejection, a plate conflict, and a storage fault
/// are distinct variants. The controller folds all of these into its
/// user-visible `error` string; nothing here is meant to escape as a panic.
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("invalid motorcycle data: {0}")]
    Validation(String),

    #[error("a motorcycle with plate {0} is already registered")]
    DuplicatePlate(String),

    #[error("motorcycle not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FleetError>;
