//! HTTP Layer - RESTful API + WebSocket

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use middleware::ERRNO_HEADER;
pub use routes::create_routes;
pub use server::HttpServer;
pub use state::AppState;
