//! In-process integration tests driving the full router and stage chains.

use std::sync::Arc;
use std::time::Duration;

use roster::api;
use roster::config::{Config, Environment};
use roster::middleware::cache::CacheStore;
use roster::repository::{EmployeeRepository, InMemoryEmployeeRepository};
use roster::router::Router;
use roster::{Request, Response, StatusCode};

fn app_with(config: Config) -> Router {
    let repo: Arc<dyn EmployeeRepository> = Arc::new(InMemoryEmployeeRepository::seeded());
    let cache = Arc::new(CacheStore::new(Duration::from_secs(config.cache_ttl)));
    api::build_router(repo, cache, &config)
}

fn app() -> Router {
    app_with(Config::default())
}

fn request(method: &str, target: &str) -> Request {
    let raw = format!("{method} {target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    let (req, _) = Request::parse(raw.as_bytes()).unwrap();
    req
}

fn request_with_body(method: &str, target: &str, body: &str) -> Request {
    let raw = format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let (req, _) = Request::parse(raw.as_bytes()).unwrap();
    req
}

fn json_body(response: &Response) -> serde_json::Value {
    serde_json::from_slice(response.payload()).expect("response body should be JSON")
}

const ANN: &str = r#"{"Name": "Ann", "Position": "QA", "Salary": 50000}"#;

// ── Reads ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_the_seeded_collection() {
    let router = app();
    let response = router.dispatch(request("GET", "/employees")).await;

    assert_eq!(response.status(), StatusCode::Ok);
    let employees = json_body(&response);
    let employees = employees.as_array().unwrap();
    assert_eq!(employees.len(), 2);
    assert_eq!(employees[0]["Id"], 1);
    assert_eq!(employees[0]["Name"], "John Doe");
    assert_eq!(employees[1]["Position"], "Project Manager");
}

#[tokio::test]
async fn get_unknown_id_is_404() {
    let router = app();
    let response = router.dispatch(request("GET", "/employees/99")).await;

    assert_eq!(response.status(), StatusCode::NotFound);
    assert_eq!(json_body(&response)["Message"], "Employee with ID 99 not found.");
}

#[tokio::test]
async fn non_integer_id_is_a_client_error() {
    let router = app();
    let response = router.dispatch(request("GET", "/employees/abc")).await;
    assert_eq!(response.status(), StatusCode::BadRequest);
}

// ── Create / read-after-write ─────────────────────────────────────────────────

#[tokio::test]
async fn post_creates_with_the_next_id_and_location_header() {
    let router = app();
    let response = router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;

    assert_eq!(response.status(), StatusCode::Created);
    assert_eq!(response.headers().get("location"), Some("/employees/3"));

    let created = json_body(&response);
    assert_eq!(created["Id"], 3);
    assert_eq!(created["Name"], "Ann");
    assert_eq!(created["Position"], "QA");
    assert_eq!(created["Salary"], 50000.0);
}

#[tokio::test]
async fn get_after_post_returns_the_submitted_fields() {
    let router = app();
    router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;

    let response = router.dispatch(request("GET", "/employees/3")).await;
    assert_eq!(response.status(), StatusCode::Ok);

    let employee = json_body(&response);
    assert_eq!(employee["Id"], 3);
    assert_eq!(employee["Name"], "Ann");
    assert_eq!(employee["Position"], "QA");
    assert_eq!(employee["Salary"], 50000.0);
}

#[tokio::test]
async fn ids_are_never_reused_after_deletion() {
    let router = app();
    let first = router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;
    assert_eq!(json_body(&first)["Id"], 3);

    let deleted = router.dispatch(request("DELETE", "/employees/3")).await;
    assert_eq!(deleted.status(), StatusCode::NoContent);

    let second = router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;
    assert_eq!(json_body(&second)["Id"], 4);
}

// ── Update / delete ───────────────────────────────────────────────────────────

#[tokio::test]
async fn put_replaces_fields_of_an_existing_record() {
    let router = app();
    let body = r#"{"Name": "Jane Q. Smith", "Position": "Director", "Salary": 95000}"#;
    let response = router
        .dispatch(request_with_body("PUT", "/employees/2", body))
        .await;

    assert_eq!(response.status(), StatusCode::Ok);
    let updated = json_body(&response);
    assert_eq!(updated["Id"], 2);
    assert_eq!(updated["Name"], "Jane Q. Smith");

    let fetched = router.dispatch(request("GET", "/employees/2")).await;
    assert_eq!(json_body(&fetched)["Position"], "Director");
}

#[tokio::test]
async fn put_unknown_id_is_404_and_alters_nothing() {
    let router = app();
    let response = router
        .dispatch(request_with_body("PUT", "/employees/99", ANN))
        .await;
    assert_eq!(response.status(), StatusCode::NotFound);

    let list = router.dispatch(request("GET", "/employees")).await;
    let employees = json_body(&list);
    assert_eq!(employees.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_unknown_id_is_404_and_idempotent() {
    let router = app();
    for _ in 0..2 {
        let response = router.dispatch(request("DELETE", "/employees/99")).await;
        assert_eq!(response.status(), StatusCode::NotFound);
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_payload_reports_every_violation_and_creates_nothing() {
    let router = app();
    let body = r#"{"Name": "", "Position": "QA", "Salary": 10}"#;
    let response = router
        .dispatch(request_with_body("POST", "/employees", body))
        .await;

    assert_eq!(response.status(), StatusCode::BadRequest);
    let json = json_body(&response);
    assert_eq!(json["Message"], "Validation Failed");
    let errors = json["Errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.as_str().unwrap().contains("Name")));
    assert!(errors.iter().any(|e| e.as_str().unwrap().contains("Salary")));

    let list = router.dispatch(request("GET", "/employees")).await;
    assert_eq!(json_body(&list).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn out_of_range_salary_is_rejected_on_update() {
    let router = app();
    let body = r#"{"Name": "Jane Smith", "Position": "PM", "Salary": 500000}"#;
    let response = router
        .dispatch(request_with_body("PUT", "/employees/2", body))
        .await;
    assert_eq!(response.status(), StatusCode::BadRequest);

    let fetched = router.dispatch(request("GET", "/employees/2")).await;
    assert_eq!(json_body(&fetched)["Salary"], 80000.0);
}

#[tokio::test]
async fn missing_payload_is_rejected() {
    let router = app();
    let response = router.dispatch(request("POST", "/employees")).await;

    assert_eq!(response.status(), StatusCode::BadRequest);
    let json = json_body(&response);
    assert!(
        json["Message"]
            .as_str()
            .unwrap()
            .starts_with("Missing payload")
    );
}

// ── Caching ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn list_is_served_from_cache_within_the_ttl() {
    let router = app();

    let first = router.dispatch(request("GET", "/employees")).await;

    // A write inside the TTL window is not yet visible through the cache.
    router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;

    let second = router.dispatch(request("GET", "/employees")).await;
    assert_eq!(second.status(), StatusCode::Ok);
    assert_eq!(
        json_body(&second).as_array().unwrap().len(),
        2,
        "cached payload should predate the write"
    );
    assert_eq!(first.into_bytes(), second.into_bytes());
}

#[tokio::test(start_paused = true)]
async fn list_is_refreshed_after_the_ttl_expires() {
    let config = Config::default();
    let ttl = Duration::from_secs(config.cache_ttl);
    let router = app_with(config);

    router.dispatch(request("GET", "/employees")).await;
    router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;

    tokio::time::advance(ttl).await;

    let refreshed = router.dispatch(request("GET", "/employees")).await;
    assert_eq!(json_body(&refreshed).as_array().unwrap().len(), 3);
}

// ── Error boundary ────────────────────────────────────────────────────────────

#[tokio::test]
async fn injected_fault_produces_a_problem_body_with_detail_in_development() {
    let router = app_with(Config {
        environment: Environment::Development,
        ..Config::default()
    });

    let response = router.dispatch(request("GET", "/employees?fail=true")).await;
    assert_eq!(response.status(), StatusCode::InternalServerError);

    let json = json_body(&response);
    assert_eq!(json["Title"], "An unexpected error occurred.");
    assert_eq!(json["Status"], 500);
    assert!(json["Detail"].as_str().unwrap().contains("fail query parameter"));
}

#[tokio::test]
async fn production_hides_failure_detail() {
    let router = app_with(Config {
        environment: Environment::Production,
        ..Config::default()
    });

    let response = router.dispatch(request("GET", "/employees?fail=true")).await;
    assert_eq!(response.status(), StatusCode::InternalServerError);
    assert_eq!(json_body(&response)["Detail"], "Please contact support.");
}

#[tokio::test]
async fn failed_responses_are_not_cached() {
    let router = app();

    let failed = router.dispatch(request("GET", "/employees?fail=true")).await;
    assert_eq!(failed.status(), StatusCode::InternalServerError);

    // The failure must not poison subsequent identical requests.
    let again = router.dispatch(request("GET", "/employees?fail=true")).await;
    assert_eq!(again.status(), StatusCode::InternalServerError);

    let healthy = router.dispatch(request("GET", "/employees")).await;
    assert_eq!(healthy.status(), StatusCode::Ok);
}

// ── Routing edges ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_is_404() {
    let router = app();
    let response = router.dispatch(request("GET", "/departments")).await;
    assert_eq!(response.status(), StatusCode::NotFound);
}

#[tokio::test]
async fn known_path_with_wrong_method_is_405() {
    let router = app();
    let response = router.dispatch(request("PATCH", "/employees")).await;
    assert_eq!(response.status(), StatusCode::MethodNotAllowed);
}

// ── Worked example ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_read_delete_sequence() {
    let router = app();

    let created = router
        .dispatch(request_with_body("POST", "/employees", ANN))
        .await;
    assert_eq!(created.status(), StatusCode::Created);
    assert_eq!(json_body(&created)["Id"], 3);

    let fetched = router.dispatch(request("GET", "/employees/3")).await;
    assert_eq!(fetched.status(), StatusCode::Ok);
    assert_eq!(json_body(&fetched)["Id"], 3);

    let deleted = router.dispatch(request("DELETE", "/employees/3")).await;
    assert_eq!(deleted.status(), StatusCode::NoContent);

    let missing = router.dispatch(request("GET", "/employees/3")).await;
    assert_eq!(missing.status(), StatusCode::NotFound);
}
