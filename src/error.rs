use thiserror::Error;

/// Errors surfaced by the training harness. Every variant is fatal to the
/// current run; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied an invalid combination of arguments.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A batch was requested before the buffer held enough transitions.
    #[error("replay buffer holds {available} transitions, {requested} requested")]
    InsufficientData { requested: usize, available: usize },

    /// A simulator failed. The source error is kept as-is.
    #[error("environment error: {0}")]
    Environment(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A loss became NaN or infinite.
    #[error("{loss} loss diverged to {value}")]
    NumericDivergence { loss: &'static str, value: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Torch(#[from] tch::TchError),
}

impl Error {
    pub fn environment<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Environment(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
