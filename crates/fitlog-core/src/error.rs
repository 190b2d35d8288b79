use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid date input: {input:?}")]
    InvalidDateInput { input: String },

    #[error("invalid window: {days} days")]
    InvalidWindow { days: i64 },

    #[error("record {record_id} references unknown category {category_id}")]
    MissingCategory {
        record_id: String,
        category_id: String,
    },

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
