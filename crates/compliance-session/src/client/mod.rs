//! HTTP access to the Compliance Console backend.

pub mod authorized;
pub mod http;

pub use authorized::AuthorizedClient;
pub use http::HttpAuthApi;
pub use reqwest::Method;
