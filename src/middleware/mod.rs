//! Middleware pipeline: composable stages wrapped around request handlers.
//!
//! Each stage receives the per-request [`Context`] and a [`Next`] cursor into
//! the remainder of the chain. A stage may:
//!
//! - **Pass through**: call `next.run(ctx).await` unchanged.
//! - **Short-circuit**: return its own response without calling `next`
//!   (a cache hit, a validation rejection).
//! - **Decorate**: call downstream, then inspect or annotate the outcome.
//!
//! The chain output is [`HandlerResult`], so expected outcomes flow as
//! responses while unexpected failures travel as errors to the outermost
//! boundary ([`recover::Recover`]).

pub mod cache;
pub mod logging;
pub mod recover;
pub mod validation;

use std::{future::Future, pin::Pin, sync::Arc};

use crate::context::Context;
use crate::error::{ApiError, HandlerResult};

/// A type-erased, reference-counted pipeline stage.
///
/// Every entry in a stage list is stored as a `MiddlewareFn`. The [`Arc`]
/// wrapper makes stages cheap to clone so that [`Next`] can advance through
/// the chain without copying closures.
pub type MiddlewareFn = Arc<
    dyn Fn(Context, Next) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>>
        + Send
        + Sync
        + 'static,
>;

/// The trait implemented by all pipeline stages.
///
/// Implementations must be `Send + Sync` because stages are shared across
/// Tokio tasks, and `handle` must return a pinned `Send` future so it can be
/// awaited on a multi-threaded runtime.
pub trait Middleware: Send + Sync {
    /// Handles the request, optionally delegating to the rest of the chain
    /// via [`Next::run`].
    fn handle(
        &self,
        ctx: Context,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>>;
}

/// Converts a [`Middleware`] implementation into a [`MiddlewareFn`].
pub fn from_middleware<M>(middleware: Arc<M>) -> MiddlewareFn
where
    M: Middleware + 'static,
{
    Arc::new(move |ctx: Context, next: Next| middleware.handle(ctx, next))
}

/// A cursor into the remaining stage chain for a single request.
///
/// `Next` is consumed by [`run`](Self::run), so a stage cannot invoke its
/// downstream more than once.
pub struct Next {
    stages: Vec<MiddlewareFn>,
    // Which stage to invoke on the next `run` call.
    index: usize,
}

impl Next {
    /// Creates a cursor positioned at the start of the given stage chain.
    pub fn new(stages: Vec<MiddlewareFn>) -> Self {
        Self { stages, index: 0 }
    }

    /// Invokes the next stage in the chain and returns its outcome.
    ///
    /// An exhausted chain (no stage produced a response) is an
    /// [`ApiError::ChainExhausted`], bound for the error boundary; a
    /// correctly wired route always terminates in a handler stage.
    pub async fn run(mut self, ctx: Context) -> HandlerResult {
        if self.index < self.stages.len() {
            let stage = self.stages[self.index].clone();
            self.index += 1;
            stage(ctx, self).await
        } else {
            Err(ApiError::ChainExhausted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Response, StatusCode};
    use std::sync::Mutex;

    fn make_ctx() -> Context {
        let raw = b"GET /employees HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (req, _) = Request::parse(raw).unwrap();
        Context::new(req)
    }

    fn terminal(status: StatusCode) -> MiddlewareFn {
        Arc::new(move |_ctx, _next| Box::pin(async move { Ok(Response::new(status)) }))
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let next = Next::new(vec![]);
        let outcome = next.run(make_ctx()).await;
        assert!(matches!(outcome, Err(ApiError::ChainExhausted)));
    }

    #[tokio::test]
    async fn stages_run_in_order() {
        let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let record = |label: &'static str, trace: Arc<Mutex<Vec<&'static str>>>| -> MiddlewareFn {
            Arc::new(move |ctx, next| {
                let trace = Arc::clone(&trace);
                Box::pin(async move {
                    trace.lock().unwrap().push(label);
                    next.run(ctx).await
                })
            })
        };

        let chain = vec![
            record("outer", Arc::clone(&trace)),
            record("inner", Arc::clone(&trace)),
            terminal(StatusCode::Ok),
        ];
        let outcome = Next::new(chain).run(make_ctx()).await.unwrap();

        assert_eq!(outcome.status(), StatusCode::Ok);
        assert_eq!(*trace.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_downstream() {
        let reached = Arc::new(Mutex::new(false));
        let reached_clone = Arc::clone(&reached);

        let gate: MiddlewareFn = Arc::new(|_ctx, _next| {
            Box::pin(async { Ok(Response::new(StatusCode::BadRequest)) })
        });
        let downstream: MiddlewareFn = Arc::new(move |ctx, next| {
            let reached = Arc::clone(&reached_clone);
            Box::pin(async move {
                *reached.lock().unwrap() = true;
                next.run(ctx).await
            })
        });

        let outcome = Next::new(vec![gate, downstream, terminal(StatusCode::Ok)])
            .run(make_ctx())
            .await
            .unwrap();

        assert_eq!(outcome.status(), StatusCode::BadRequest);
        assert!(!*reached.lock().unwrap());
    }

    #[tokio::test]
    async fn errors_propagate_outward() {
        let failing: MiddlewareFn = Arc::new(|_ctx, _next| {
            Box::pin(async { Err(ApiError::Injected("stage failure".to_owned())) })
        });
        let outcome = Next::new(vec![failing, terminal(StatusCode::Ok)])
            .run(make_ctx())
            .await;
        assert!(matches!(outcome, Err(ApiError::Injected(_))));
    }
}
