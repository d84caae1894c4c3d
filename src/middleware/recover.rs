//! Global error boundary stage.
//!
//! Installed as a router-global layer so it wraps every route's chain (and
//! the no-route path). Anything that escapes downstream as an error is
//! logged in full and converted into the structured `500` problem body,
//! with the underlying detail revealed only in a development environment.

use std::{future::Future, pin::Pin};

use tracing::error;

use crate::config::Environment;
use crate::context::Context;
use crate::error::{HandlerResult, Problem};
use crate::middleware::{Middleware, Next};

/// Converts escaped pipeline errors into sanitized `500` responses.
pub struct Recover {
    environment: Environment,
}

impl Recover {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl Middleware for Recover {
    fn handle(
        &self,
        ctx: Context,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
        let environment = self.environment;
        Box::pin(async move {
            match next.run(ctx).await {
                Ok(response) => Ok(response),
                Err(err) => {
                    error!(error = %err, "unhandled failure reached the error boundary");
                    let detail = match environment {
                        Environment::Development => Some(err.to_string()),
                        Environment::Production => None,
                    };
                    Ok(Problem::internal(detail).into_response())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::{Request, Response, StatusCode};
    use crate::middleware::{MiddlewareFn, from_middleware};
    use std::sync::Arc;

    fn make_ctx() -> Context {
        let raw = b"GET /employees HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (req, _) = Request::parse(raw).unwrap();
        Context::new(req)
    }

    fn failing_terminal() -> MiddlewareFn {
        Arc::new(|_ctx, _next| {
            Box::pin(async { Err(ApiError::Injected("kaboom".to_owned())) })
        })
    }

    async fn run(environment: Environment, terminal: MiddlewareFn) -> Response {
        let chain = vec![from_middleware(Arc::new(Recover::new(environment))), terminal];
        Next::new(chain).run(make_ctx()).await.unwrap()
    }

    #[tokio::test]
    async fn development_reveals_detail() {
        let response = run(Environment::Development, failing_terminal()).await;
        assert_eq!(response.status(), StatusCode::InternalServerError);

        let json: serde_json::Value = serde_json::from_slice(response.payload()).unwrap();
        assert_eq!(json["Title"], "An unexpected error occurred.");
        assert_eq!(json["Status"], 500);
        assert_eq!(json["Detail"], "injected fault: kaboom");
    }

    #[tokio::test]
    async fn production_redacts_detail() {
        let response = run(Environment::Production, failing_terminal()).await;
        let json: serde_json::Value = serde_json::from_slice(response.payload()).unwrap();
        assert_eq!(json["Detail"], "Please contact support.");
    }

    #[tokio::test]
    async fn success_passes_through() {
        let terminal: MiddlewareFn =
            Arc::new(|_ctx, _next| Box::pin(async { Ok(Response::new(StatusCode::NoContent)) }));
        let response = run(Environment::Production, terminal).await;
        assert_eq!(response.status(), StatusCode::NoContent);
    }
}
