//! HTTP transport for the marketplace API
//!
//! `ApiClient` issues requests against the configured base URL, attaches the
//! session's bearer token and unwraps the response envelope. Failures are
//! normalized into `AppError::Transport` / `AppError::Api`.

mod client;
mod multipart;
mod session;

pub use client::ApiClient;
pub use multipart::{FileUpload, MultipartForm};
pub use session::Session;
