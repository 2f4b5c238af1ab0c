use model::MappingError;
use reqwest::{StatusCode, header::InvalidHeaderValue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("invalid remote url: {0}")]
    InvalidUrl(String),
    #[error("invalid credentials: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}
