pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod pipeline;
pub mod request;
pub mod upstream;

pub use error::RestError;
