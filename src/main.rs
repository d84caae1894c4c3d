//! Binary entry point: wires configuration, the seeded repository, the
//! response cache, and the router together, then serves.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use roster::api;
use roster::config::Config;
use roster::middleware::cache::CacheStore;
use roster::repository::{EmployeeRepository, InMemoryEmployeeRepository};
use roster::server::{Server, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(
        addr = %config.bind_addr,
        cache_ttl = config.cache_ttl,
        environment = ?config.environment,
        "starting roster"
    );

    // Shared state is constructed here and injected, not reached through
    // globals; tests build their own instances the same way.
    let repo: Arc<dyn EmployeeRepository> = Arc::new(InMemoryEmployeeRepository::seeded());
    let cache = Arc::new(CacheStore::new(Duration::from_secs(config.cache_ttl)));
    let router = Arc::new(api::build_router(repo, cache, &config));

    let server = Server::bind(&config.bind_addr).await?;
    server
        .run(move |request| {
            let router = Arc::clone(&router);
            async move { router.dispatch(request).await }
        })
        .await
}
