//! Network plumbing shared by the dictionary and audio fetchers.
//!
//! - [`HttpFetch`]: the async transport seam, implemented by [`ReqwestFetch`]
//! - [`RetryPolicy`] and [`retry_async`]: generic retry with pluggable backoff

mod http;
mod retry;

pub use http::{encode_path_segment, HttpFetch, HttpResponse, ReqwestFetch, TransportError};
pub use retry::{retry_async, Backoff, RetryPolicy, Retryable};
