pub mod client;
pub mod parse;

pub use client::*;
pub use parse::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Cannot reach the AI backend at {0}")]
    Connection(String),

    #[error("AI backend returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response decoding error: {0}")]
    Decoding(String),

    #[error("AI backend returned no choices")]
    EmptyResponse,
}
