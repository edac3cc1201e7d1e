use thiserror::Error;

#[derive(Error, Debug)]
pub enum BracketError {
    #[error("Insufficient data: statistics cover zero trials")]
    InsufficientData,

    #[error("Invalid configuration: {field} must be strictly positive, got {value}")]
    InvalidConfiguration { field: &'static str, value: f64 },

    #[error("Invalid match table: {0}")]
    InvalidMatchTable(String),

    #[error("Invalid bracket shape: {0}")]
    InvalidShape(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BracketError {
    /// Whether the caller can fall back to an empty/default presentation
    /// instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        match self {
            BracketError::InsufficientData => true,
            BracketError::InvalidConfiguration { .. } => false,
            BracketError::InvalidMatchTable(_) => false,
            BracketError::InvalidShape(_) => false,
            BracketError::Io(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BracketError>;
