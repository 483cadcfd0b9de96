use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint answered with a non-success status.
    #[error("OpenRouter API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("OpenRouter request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}
