//! The employee CRUD surface: handler functions and route wiring.

pub mod handlers;
pub mod routes;

pub use routes::build_router;
