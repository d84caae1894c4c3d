//! # roster
//!
//! An employee roster HTTP CRUD service built on a small async HTTP/1.1
//! stack with a composable request pipeline.
//!
//! Every route carries an ordered list of pipeline stages that wrap its
//! handler: request logging, response caching with a TTL, and JSON payload
//! validation. A global error boundary converts anything that escapes the
//! chain into a structured `500` body.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use roster::api;
//! use roster::config::Config;
//! use roster::middleware::cache::CacheStore;
//! use roster::repository::InMemoryEmployeeRepository;
//! use roster::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let repo = Arc::new(InMemoryEmployeeRepository::seeded());
//!     let cache = Arc::new(CacheStore::new(Duration::from_secs(config.cache_ttl)));
//!     let router = Arc::new(api::build_router(repo, cache, &config));
//!
//!     let server = Server::bind(&config.bind_addr).await?;
//!     server
//!         .run(move |req| {
//!             let router = Arc::clone(&router);
//!             async move { router.dispatch(req).await }
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod employee;
pub mod error;
pub mod http;
pub mod middleware;
pub mod repository;
pub mod router;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use employee::{Employee, EmployeeDraft};
pub use error::{ApiError, HandlerResult};
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use server::{Server, ServerError};
