//! JSON payload validation stage, generic over the payload type.
//!
//! [`JsonBody<T>`] decodes the request body as `T`, runs its constraint
//! checks, and either short-circuits with a `400` listing every violation or
//! hands the decoded value to the rest of the chain through the context
//! extensions.

use std::marker::PhantomData;
use std::{future::Future, pin::Pin};

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::context::Context;
use crate::error::HandlerResult;
use crate::http::{Response, StatusCode};
use crate::middleware::{Middleware, Next};

/// Field-level constraint checks for a payload type.
pub trait Validate {
    /// Checks every constraint, returning all violation messages at once
    /// rather than stopping at the first.
    fn validate(&self) -> Result<(), Vec<String>>;
}

/// Pipeline stage that binds and validates a JSON payload of type `T`.
///
/// On success the decoded `T` is inserted into the context extensions, where
/// the terminal handler retrieves it. Downstream outcomes are forwarded
/// unchanged.
pub struct JsonBody<T> {
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonBody<T> {
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<T> Default for JsonBody<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Short type name for client-facing messages (strips the module path).
fn short_type_name<T>() -> &'static str {
    std::any::type_name::<T>()
        .rsplit("::")
        .next()
        .unwrap_or("payload")
}

impl<T> Middleware for JsonBody<T>
where
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    fn handle(
        &self,
        mut ctx: Context,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
        Box::pin(async move {
            if ctx.request().body().is_empty() {
                warn!(payload = short_type_name::<T>(), "missing request payload");
                let body = json!({
                    "Message": format!("Missing payload of type {}", short_type_name::<T>()),
                });
                return Response::json(StatusCode::BadRequest, &body).map_err(Into::into);
            }

            let payload: T = match ctx.json() {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(payload = short_type_name::<T>(), error = %err, "undecodable request payload");
                    let body = json!({
                        "Message": format!("Missing payload of type {}", short_type_name::<T>()),
                    });
                    return Response::json(StatusCode::BadRequest, &body).map_err(Into::into);
                }
            };

            if let Err(violations) = payload.validate() {
                warn!(payload = short_type_name::<T>(), ?violations, "payload validation failed");
                let body = json!({
                    "Message": "Validation Failed",
                    "Errors": violations,
                });
                return Response::json(StatusCode::BadRequest, &body).map_err(Into::into);
            }

            ctx.extensions_mut().insert(payload);
            next.run(ctx).await
        })
    }
}
