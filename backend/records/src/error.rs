use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// Cosmos DB signals throttling with this code on the Mongo API.
pub const RATE_LIMIT_CODE: i32 = 16500;

const RATE_LIMIT_MARKERS: [&str; 5] = [
    "16500",
    "429",
    "RequestRateTooLarge",
    "TooManyRequests",
    "RetryAfterMs",
];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} environment variable is not set")]
    MissingConnectionString(&'static str),

    #[error("Failed to connect: {0}")]
    Connection(String),

    #[error("Bulk write inserted {inserted} documents, {} rejected", failures.len())]
    PartialWrite { inserted: u64, failures: Vec<String> },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Malformed document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("Unserializable record: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
}

impl StoreError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StoreError::RateLimited(_))
    }
}

impl From<MongoError> for StoreError {
    fn from(err: MongoError) -> Self {
        let code = match err.kind.as_ref() {
            ErrorKind::Command(command) => Some(command.code),
            ErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
            _ => None,
        };

        let message = err.to_string();

        if code == Some(RATE_LIMIT_CODE) || is_rate_limit_message(&message) {
            StoreError::RateLimited(message)
        } else {
            StoreError::Database(message)
        }
    }
}

pub fn is_rate_limit_message(message: &str) -> bool {
    RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
