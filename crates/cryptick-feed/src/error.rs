//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Decode error: {0}")]
    Decode(String),
}

pub type FeedResult<T> = Result<T, FeedError>;
