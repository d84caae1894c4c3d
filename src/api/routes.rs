//! Route wiring: binds the five CRUD routes to their handlers and stage
//! lists, and installs the global error boundary.
//!
//! Stage order on every route is logging first, then caching, then
//! validation, then the handler. Caching is attached to the collection GET
//! only, so item-level reads observe deletes immediately; collection
//! staleness inside the TTL window is the accepted trade-off.

use std::sync::Arc;

use crate::api::handlers;
use crate::config::Config;
use crate::context::Context;
use crate::employee::EmployeeDraft;
use crate::middleware::cache::{CacheStore, ResponseCache};
use crate::middleware::from_middleware;
use crate::middleware::logging::RequestLog;
use crate::middleware::recover::Recover;
use crate::middleware::validation::JsonBody;
use crate::repository::EmployeeRepository;
use crate::router::Router;

/// Builds the application router over explicitly injected repository and
/// cache instances.
pub fn build_router(
    repo: Arc<dyn EmployeeRepository>,
    cache: Arc<CacheStore>,
    config: &Config,
) -> Router {
    let mut router = Router::new();
    router.layer(from_middleware(Arc::new(Recover::new(config.environment))));

    let log = from_middleware(Arc::new(RequestLog));
    let cached = from_middleware(Arc::new(ResponseCache::new(cache)));
    let validated = from_middleware(Arc::new(JsonBody::<EmployeeDraft>::new()));

    {
        let repo = Arc::clone(&repo);
        router
            .get("/employees", move |ctx: Context| {
                handlers::list_employees(Arc::clone(&repo), ctx)
            })
            .layer(log.clone())
            .layer(cached);
    }

    {
        let repo = Arc::clone(&repo);
        router
            .get("/employees/:id", move |ctx: Context| {
                handlers::get_employee(Arc::clone(&repo), ctx)
            })
            .layer(log.clone());
    }

    {
        let repo = Arc::clone(&repo);
        router
            .post("/employees", move |ctx: Context| {
                handlers::create_employee(Arc::clone(&repo), ctx)
            })
            .layer(log.clone())
            .layer(validated.clone());
    }

    {
        let repo = Arc::clone(&repo);
        router
            .put("/employees/:id", move |ctx: Context| {
                handlers::update_employee(Arc::clone(&repo), ctx)
            })
            .layer(log.clone())
            .layer(validated);
    }

    {
        let repo = Arc::clone(&repo);
        router
            .delete("/employees/:id", move |ctx: Context| {
                handlers::delete_employee(Arc::clone(&repo), ctx)
            })
            .layer(log);
    }

    router
}
