use thiserror::Error;

use crate::schema::RecordId;

#[derive(Error, Debug)]
pub enum StocktakeError {
    #[error("malformed line '{line}': expected '<name> <quantity>'")]
    Format { line: String },

    #[error("invalid quantity '{token}' in line '{line}'")]
    Quantity { line: String, token: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("no category selected; a category must be chosen before submitting items")]
    NoCategorySelected,

    #[error("no record selected for editing")]
    NoEditTarget,

    #[error("unknown blank type: {0}")]
    UnknownBlank(String),

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StocktakeError>;
