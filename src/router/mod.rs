//! Request routing: match verb + path template, extract parameters, and run
//! the route's stage chain around its handler.
//!
//! Two pattern styles are supported:
//!
//! | Pattern            | Example match    | Captured params |
//! |--------------------|------------------|-----------------|
//! | `/employees`       | `/employees`     | *(none)*        |
//! | `/employees/:id`   | `/employees/42`  | `id → "42"`     |
//!
//! Trailing slashes are normalized on both patterns and incoming paths.
//! Routes are matched in registration order; the first route whose method
//! and pattern both match wins. A path that matches some route but not the
//! request's method yields `405`; no path match yields `404`.
//!
//! Each route carries an ordered stage list run outer-to-inner before the
//! terminal handler. Router-global layers (the error boundary) wrap the
//! route stages and the no-route terminals alike.

use std::pin::Pin;
use std::sync::Arc;

use tracing::error;

use crate::context::{Context, PathParams};
use crate::error::{HandlerResult, Problem};
use crate::middleware::{MiddlewareFn, Next};
use crate::{Method, Request, Response, StatusCode};

/// Type-erased, heap-allocated async handler that terminates a stage chain.
pub type Handler = Arc<
    dyn Fn(Context) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>>
        + Send
        + Sync
        + 'static,
>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Context) -> impl Future<Output = HandlerResult> + Send` that is
/// also `Send + Sync + 'static` implements this automatically.
pub trait IntoHandler: Send + Sync + 'static {
    /// Calls the handler with the given context, boxing the returned future.
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
        Box::pin((self)(ctx))
    }
}

// A single path segment, either a literal string or a named capture (`:name`).
#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Parameter(String),
}

// Compiled representation of a route pattern string.
#[derive(Debug, Clone)]
enum Pattern {
    // Matches one exact path string, e.g. `/employees`.
    Exact(String),
    // Matches a fixed number of segments where some may be named captures,
    // e.g. `/employees/:id`.
    Parameterized { segments: Vec<Segment> },
}

impl Pattern {
    // Compile a route pattern string. A trailing slash (other than on the
    // root `/`) is stripped first so `/employees/` and `/employees` compile
    // to identical patterns.
    fn parse(pattern: &str) -> Self {
        let pattern = if pattern != "/" && pattern.ends_with('/') {
            &pattern[..pattern.len() - 1]
        } else {
            pattern
        };

        if pattern.contains(':') {
            let segments = pattern
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| {
                    if let Some(p) = s.strip_prefix(':') {
                        Segment::Parameter(p.to_string())
                    } else {
                        Segment::Static(s.to_string())
                    }
                })
                .collect();

            return Pattern::Parameterized { segments };
        }

        Pattern::Exact(pattern.to_string())
    }

    // Try to match `path` against this pattern, returning extracted
    // [`PathParams`] on success.
    fn matches(&self, path: &str) -> Option<PathParams> {
        let path = if path != "/" && path.ends_with('/') {
            &path[..path.len() - 1]
        } else {
            path
        };

        match self {
            Pattern::Exact(p) => {
                if p == path {
                    Some(PathParams::new())
                } else {
                    None
                }
            }
            Pattern::Parameterized { segments } => {
                let mut params = PathParams::new();
                let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

                if segments.len() != path_segments.len() {
                    return None;
                }

                for (seg, path_seg) in segments.iter().zip(path_segments) {
                    match seg {
                        Segment::Static(s) => {
                            if s != path_seg {
                                return None;
                            }
                        }
                        Segment::Parameter(name) => {
                            params.insert(name.clone(), path_seg.to_string());
                        }
                    }
                }

                Some(params)
            }
        }
    }
}

/// A registered route: method + pattern + ordered stage list + handler.
pub struct Route {
    method: Method,
    pattern: Pattern,
    layers: Vec<MiddlewareFn>,
    handler: Handler,
}

impl Route {
    fn new(method: Method, pattern: &str, handler: Handler) -> Self {
        Self {
            method,
            pattern: Pattern::parse(pattern),
            layers: Vec::new(),
            handler,
        }
    }

    /// Appends a stage to this route's chain. Stages run in the order they
    /// are added, outermost first.
    pub fn layer(&mut self, stage: MiddlewareFn) -> &mut Self {
        self.layers.push(stage);
        self
    }
}

/// Dispatches requests to registered handlers through their stage chains.
///
/// # Examples
///
/// ```
/// use roster::router::Router;
/// use roster::{Response, StatusCode};
///
/// let mut router = Router::new();
/// router.get("/ping", |_ctx| async { Ok(Response::new(StatusCode::Ok)) });
/// ```
pub struct Router {
    routes: Vec<Route>,
    global_layers: Vec<MiddlewareFn>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new, empty `Router` with no registered routes.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            global_layers: Vec::new(),
        }
    }

    /// Appends a router-global stage wrapping every dispatch, including the
    /// not-found and method-not-allowed terminals.
    pub fn layer(&mut self, stage: MiddlewareFn) -> &mut Self {
        self.global_layers.push(stage);
        self
    }

    /// Registers a handler for `GET` requests matching `path`, returning the
    /// route so stages can be layered onto it.
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Get, path, handler)
    }

    /// Registers a handler for `POST` requests matching `path`.
    pub fn post(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Post, path, handler)
    }

    /// Registers a handler for `PUT` requests matching `path`.
    pub fn put(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Put, path, handler)
    }

    /// Registers a handler for `DELETE` requests matching `path`.
    pub fn delete(&mut self, path: &str, handler: impl IntoHandler) -> &mut Route {
        self.add_route(Method::Delete, path, handler)
    }

    // Erase the concrete handler type and store the new route.
    fn add_route(&mut self, method: Method, path: &str, handler: impl IntoHandler) -> &mut Route {
        let handler: Handler = Arc::new(move |ctx| handler.call(ctx));
        let index = self.routes.len();
        self.routes.push(Route::new(method, path, handler));
        &mut self.routes[index]
    }

    /// Returns the number of routes registered in this router.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatches `request` to the first matching route and returns the
    /// response produced by its stage chain.
    ///
    /// The chain is global layers, then route layers, then the terminal
    /// handler; the innermost result propagates back out unchanged unless a
    /// stage short-circuits. Errors normally stop at an installed boundary
    /// layer; the final match arm here is a safety net that sanitizes
    /// anything escaping a chain without one.
    pub async fn dispatch(&self, request: Request) -> Response {
        let mut path_matched = false;
        let mut matched: Option<(&Route, PathParams)> = None;

        for route in &self.routes {
            if let Some(params) = route.pattern.matches(request.path()) {
                if &route.method == request.method() {
                    matched = Some((route, params));
                    break;
                }
                path_matched = true;
            }
        }

        let outcome = match matched {
            Some((route, params)) => {
                let ctx = Context::with_params(request, params);
                let mut chain = self.global_layers.clone();
                chain.extend(route.layers.iter().cloned());
                let handler = Arc::clone(&route.handler);
                chain.push(Arc::new(move |ctx, _next| handler(ctx)) as MiddlewareFn);
                Next::new(chain).run(ctx).await
            }
            None => {
                let status = if path_matched {
                    StatusCode::MethodNotAllowed
                } else {
                    StatusCode::NotFound
                };
                let ctx = Context::new(request);
                let mut chain = self.global_layers.clone();
                chain.push(Arc::new(move |_ctx, _next| {
                    Box::pin(async move { Ok(Response::new(status)) })
                        as Pin<Box<dyn Future<Output = HandlerResult> + Send>>
                }) as MiddlewareFn);
                Next::new(chain).run(ctx).await
            }
        };

        match outcome {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "error escaped the middleware chain");
                Problem::internal(None).into_response()
            }
        }
    }
}
