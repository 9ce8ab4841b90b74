use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Passage pool '{name}' has no passages")]
    EmptyPool { name: String },

    #[error("Passage {index} in pool '{name}' is empty")]
    EmptyPassage { name: String, index: usize },

    #[error("Built-in passage file '{0}' not found")]
    MissingBuiltin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
