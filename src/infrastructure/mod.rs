//! Infrastructure layer - external concerns

pub mod http;

pub use http::ApiClient;
