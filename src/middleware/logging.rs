//! Request logging stage.
//!
//! Emits a start event before delegating and a completion event with the
//! elapsed duration after. Observability only: the downstream outcome is
//! forwarded untouched, success or failure.

use std::{future::Future, pin::Pin};

use tokio::time::Instant;
use tracing::info;

use crate::context::Context;
use crate::error::HandlerResult;
use crate::middleware::{Middleware, Next};

/// Logs each request's method, path, status, and duration.
///
/// This stage never short-circuits.
pub struct RequestLog;

impl Middleware for RequestLog {
    fn handle(
        &self,
        ctx: Context,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
        Box::pin(async move {
            let method = ctx.request().method().as_str().to_owned();
            let path = ctx.request().path().to_owned();
            info!(%method, %path, "request started");

            let start = Instant::now();
            let outcome = next.run(ctx).await;
            let elapsed = start.elapsed();

            match &outcome {
                Ok(response) => {
                    info!(%method, %path, status = response.status().as_u16(), ?elapsed, "request finished");
                }
                Err(_) => {
                    // The error boundary logs the failure itself; here we only
                    // record that the request is over.
                    info!(%method, %path, ?elapsed, "request finished with error");
                }
            }

            outcome
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

    #[tokio::test]
    async fn forwards_response_unchanged() {
        let terminal: MiddlewareFn = Arc::new(|_ctx, _next| {
            Box::pin(async {
                Ok(Response::new(StatusCode::Created).header("Location", "/employees/3"))
            })
        });
        let chain = vec![from_middleware(Arc::new(RequestLog)), terminal];

        let response = Next::new(chain).run(make_ctx()).await.unwrap();
        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(response.headers().get("location"), Some("/employees/3"));
    }

    #[tokio::test]
    async fn forwards_error_unchanged() {
        let terminal: MiddlewareFn = Arc::new(|_ctx, _next| {
            Box::pin(async { Err(ApiError::Injected("downstream".to_owned())) })
        });
        let chain = vec![from_middleware(Arc::new(RequestLog)), terminal];

        let outcome = Next::new(chain).run(make_ctx()).await;
        assert!(matches!(outcome, Err(ApiError::Injected(_))));
    }
}
