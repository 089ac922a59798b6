use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Image fetch returned HTTP {status}")]
    UpstreamFetch { status: u16, body: String },
    #[error("Image could not be decoded: {0}")]
    ImageDecode(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
