//! The five employee CRUD handlers.
//!
//! Handlers produce expected outcomes (200/201/204, 404, 400) as ordinary
//! responses; only unexpected failures leave as errors for the boundary.
//! POST and PUT handlers take their payload from the context extensions,
//! where the validation stage left it.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::employee::EmployeeDraft;
use crate::error::{ApiError, HandlerResult};
use crate::http::{Response, StatusCode};
use crate::repository::EmployeeRepository;

// A `{"Message": ...}` JSON reply.
fn message(status: StatusCode, text: impl Into<String>) -> HandlerResult {
    Response::json(status, &json!({ "Message": text.into() })).map_err(Into::into)
}

fn employee_not_found(id: u64) -> HandlerResult {
    message(
        StatusCode::NotFound,
        format!("Employee with ID {id} not found."),
    )
}

// The `:id` capture as an integer. `None` means the path segment was not a
// number, which is a client error rather than a lookup miss.
fn parse_id(ctx: &Context) -> Option<u64> {
    ctx.params().get("id")?.parse().ok()
}

// Takes the payload the validation stage stashed in the extensions.
fn take_draft(ctx: &mut Context) -> Result<EmployeeDraft, ApiError> {
    ctx.extensions_mut()
        .remove::<EmployeeDraft>()
        .ok_or(ApiError::MissingPayload {
            type_name: "EmployeeDraft",
        })
}

/// `GET /employees`: the full collection.
///
/// `?fail=true` injects a failure, giving clients and tests a way to
/// exercise the error boundary end to end.
pub async fn list_employees(repo: Arc<dyn EmployeeRepository>, ctx: Context) -> HandlerResult {
    if ctx.request().query_param("fail") == Some("true") {
        return Err(ApiError::Injected(
            "failure requested via the fail query parameter".to_owned(),
        ));
    }

    debug!("fetching all employees");
    let employees = repo.list().await;
    Response::json(StatusCode::Ok, &employees).map_err(Into::into)
}

/// `GET /employees/:id`: one record, or 404.
pub async fn get_employee(repo: Arc<dyn EmployeeRepository>, ctx: Context) -> HandlerResult {
    let Some(id) = parse_id(&ctx) else {
        return message(StatusCode::BadRequest, "Id must be an integer.");
    };

    match repo.get(id).await {
        Some(employee) => Response::json(StatusCode::Ok, &employee).map_err(Into::into),
        None => {
            warn!(id, "employee not found");
            employee_not_found(id)
        }
    }
}

/// `POST /employees`: create under a fresh id, reply 201 with a `Location`
/// header pointing at the new resource.
pub async fn create_employee(repo: Arc<dyn EmployeeRepository>, mut ctx: Context) -> HandlerResult {
    let draft = take_draft(&mut ctx)?;
    let created = repo.add(draft).await;
    info!(id = created.id, "employee created");

    let location = format!("/employees/{}", created.id);
    Ok(Response::json(StatusCode::Created, &created)?.header("Location", location))
}

/// `PUT /employees/:id`: replace the record's fields, or 404 when the id is
/// unknown.
pub async fn update_employee(repo: Arc<dyn EmployeeRepository>, mut ctx: Context) -> HandlerResult {
    let Some(id) = parse_id(&ctx) else {
        return message(StatusCode::BadRequest, "Id must be an integer.");
    };
    let draft = take_draft(&mut ctx)?;

    match repo.update(id, draft).await {
        Some(updated) => {
            info!(id, "employee updated");
            Response::json(StatusCode::Ok, &updated).map_err(Into::into)
        }
        None => {
            warn!(id, "attempted to update non-existent employee");
            employee_not_found(id)
        }
    }
}

/// `DELETE /employees/:id`: 204 on success, 404 when the id is unknown.
pub async fn delete_employee(repo: Arc<dyn EmployeeRepository>, ctx: Context) -> HandlerResult {
    let Some(id) = parse_id(&ctx) else {
        return message(StatusCode::BadRequest, "Id must be an integer.");
    };

    if repo.remove(id).await {
        info!(id, "employee deleted");
        Ok(Response::new(StatusCode::NoContent))
    } else {
        warn!(id, "attempted to delete non-existent employee");
        employee_not_found(id)
    }
}
