// HTTP surface: response assembly, routing and the server

pub mod response;
pub mod routes;
pub mod server;

pub use response::{ApiResponse, HeaderProfile};
pub use server::{AppState, Deployment, HttpServer};
