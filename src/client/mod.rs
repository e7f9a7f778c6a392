//! HTTP access to the accounting API
//!
//! The pipeline talks to the API through the [`HttpTransport`] port. The
//! production transport is a blocking reqwest client; [`RetryingTransport`]
//! wraps any transport with the retry/backoff policy so the services above it
//! never see a transient status unless the retry budget is spent.

pub mod retry;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use retry::{RetryPolicy, RetryingTransport, Sleeper, ThreadSleeper};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
