use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("persisted lock record I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed lock record: {0}")]
    Malformed(String),

    #[error("failed to load scenario file: {0}")]
    ScenarioLoad(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArbiterError>;
