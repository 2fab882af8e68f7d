use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Failed to reach model server at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Model server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Model server returned an invalid body: {0}")]
    InvalidResponse(String),

    #[error("Model returned an empty reply")]
    EmptyReply,
}
