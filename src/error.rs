use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetupError>;

/// Errors raised while building or persisting a run. Stepping itself cannot fail.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("initial state has {positions} positions but {velocities} velocities")]
    InvalidSeedState { positions: usize, velocities: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl SetupError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SetupError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
