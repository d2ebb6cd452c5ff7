//! Source adapter implementations.

pub mod http;

pub use http::HttpSourceAdapter;
