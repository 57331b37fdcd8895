//! Remote command API
//!
//! Typed access to the queue, verification and acknowledgment endpoints.

mod client;
mod error;
mod http;
mod types;

pub use client::RemoteApi;
#[cfg(test)]
pub use client::mock;
pub use error::ApiError;
pub use http::HttpApiClient;
pub use types::{CommandEntry, ErrorBody, QueueEnvelope, encode_ids, parse_error_message, parse_queue};
