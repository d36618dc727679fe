//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign / propagate request ID)
//!     → include middleware (expand `<name>_url` links)
//!     → resources.rs (demo catalog handlers)
//!     → Send to client
//! ```

pub mod request;
pub mod resources;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
