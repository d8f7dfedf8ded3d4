pub mod api;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod test_support;

pub use api::{ApiReply, HttpAyurApi};
pub use client::BackendClient;
pub use error::ApiError;
