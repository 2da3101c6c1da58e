//! REST layer exercised through the real route registration.

mod common;

use anyhow::Result;
use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{body_json, create_test_router, empty_request, json_request};
use users_projects::api::rest::dto::{ProjectDto, UserDto};
use users_projects::api::rest::problem::APPLICATION_PROBLEM_JSON;

async fn send(router: &Router, req: axum::http::Request<axum::body::Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn create_user(router: &Router, body: Value) -> UserDto {
    let (status, json) = send(router, json_request("POST", "/api/users", &body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    serde_json::from_value(json).unwrap()
}

async fn create_project(router: &Router, body: Value) -> ProjectDto {
    let (status, json) = send(router, json_request("POST", "/api/projects", &body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    serde_json::from_value(json).unwrap()
}

#[tokio::test]
async fn test_create_user() -> Result<()> {
    let router = create_test_router().await;
    let user = create_user(
        &router,
        json!({"name": "Paul", "email": "pl@atu.ie", "age": 25, "student_id": "S1234567"}),
    )
    .await;
    assert_eq!(user.name, "Paul");
    assert_eq!(user.student_id, "S1234567");
    Ok(())
}

#[tokio::test]
async fn test_put_user_replaces_fields() -> Result<()> {
    let router = create_test_router().await;
    let user = create_user(
        &router,
        json!({"name": "Alice", "email": "alice@example.com", "age": 22, "student_id": "S1111111"}),
    )
    .await;

    let payload =
        json!({"name": "Jane", "email": "jane@example.com", "age": 24, "student_id": "S1111111"});
    let (status, data) = send(
        &router,
        json_request("PUT", &format!("/api/users/{}", user.id), &payload),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(data["name"], "Jane");
    assert_eq!(data["email"], "jane@example.com");
    assert_eq!(data["age"], 24);
    Ok(())
}

#[tokio::test]
async fn test_patch_user_keeps_omitted_fields() -> Result<()> {
    let router = create_test_router().await;
    let user = create_user(
        &router,
        json!({"name": "Bob", "email": "bob@example.com", "age": 22, "student_id": "S2222222"}),
    )
    .await;

    let (status, data) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/api/users/{}", user.id),
            &json!({"email": "bobNew@example.com"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(data["name"], "Bob");
    assert_eq!(data["email"], "bobNew@example.com");
    assert_eq!(data["age"], 22);
    assert_eq!(data["student_id"], "S2222222");

    let (status, fetched) = send(&router, empty_request("GET", &format!("/api/users/{}", user.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, data);
    Ok(())
}

#[tokio::test]
async fn test_put_project() -> Result<()> {
    let router = create_test_router().await;
    let owner = create_user(
        &router,
        json!({"name": "Owner1", "email": "owner1@example.com", "age": 30, "student_id": "S1000001"}),
    )
    .await;
    let project = create_project(
        &router,
        json!({"name": "CICD 2", "description": "Xmas project", "owner_id": owner.id}),
    )
    .await;

    let payload = json!({"name": "Full Stack", "description": "React project", "owner_id": owner.id});
    let (status, data) = send(
        &router,
        json_request("PUT", &format!("/api/projects/{}", project.id), &payload),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(data["name"], "Full Stack");
    assert_eq!(data["description"], "React project");
    assert_eq!(data["owner_id"], owner.id);
    Ok(())
}

#[tokio::test]
async fn test_patch_project() -> Result<()> {
    let router = create_test_router().await;
    let owner = create_user(
        &router,
        json!({"name": "Owner2", "email": "owner2@example.com", "age": 28, "student_id": "S1000002"}),
    )
    .await;
    let project = create_project(
        &router,
        json!({"name": "RTOS", "description": "RTOS mini project", "owner_id": owner.id}),
    )
    .await;

    let (status, data) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/api/projects/{}", project.id),
            &json!({"description": "Embedded RTOS project"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(data["description"], "Embedded RTOS project");
    assert_eq!(data["name"], "RTOS");
    assert_eq!(data["owner_id"], owner.id);
    Ok(())
}

#[tokio::test]
async fn test_list_endpoints() -> Result<()> {
    let router = create_test_router().await;
    let owner = create_user(
        &router,
        json!({"name": "Owner", "email": "owner@example.com", "age": 40, "student_id": "S7000000"}),
    )
    .await;
    create_project(
        &router,
        json!({"name": "One", "description": "", "owner_id": owner.id}),
    )
    .await;

    let (status, users) = send(&router, empty_request("GET", "/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().map(Vec::len), Some(1));

    let (status, projects) = send(&router, empty_request("GET", "/api/projects")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects[0]["owner_id"], owner.id);
    Ok(())
}

#[tokio::test]
async fn test_not_found_is_problem_json() -> Result<()> {
    let router = create_test_router().await;

    let response = router
        .clone()
        .oneshot(json_request("PATCH", "/api/users/999", &json!({"age": 30})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let ct = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert_eq!(ct, APPLICATION_PROBLEM_JSON);

    let problem = body_json(response).await;
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["code"], "USERS_NOT_FOUND");
    assert_eq!(problem["instance"], "/api/users/999");

    let (status, _) = send(&router, empty_request("GET", "/api/projects/7")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_conflicts() -> Result<()> {
    let router = create_test_router().await;
    create_user(
        &router,
        json!({"name": "Alice", "email": "alice@example.com", "age": 22, "student_id": "S1111111"}),
    )
    .await;

    let (status, problem) = send(
        &router,
        json_request(
            "POST",
            "/api/users",
            &json!({"name": "Eve", "email": "alice@example.com", "age": 22, "student_id": "S9999999"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["errors"][0]["pointer"], "/email");
    Ok(())
}

#[tokio::test]
async fn test_body_shape_errors_are_unprocessable() -> Result<()> {
    let router = create_test_router().await;
    let owner = create_user(
        &router,
        json!({"name": "Owner", "email": "owner@example.com", "age": 30, "student_id": "S1000001"}),
    )
    .await;
    let uri = format!("/api/users/{}", owner.id);

    // PUT must carry every field.
    let (status, _) = send(
        &router,
        json_request("PUT", &uri, &json!({"name": "Only Name"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown fields are rejected for PATCH too.
    let (status, problem) = send(&router, json_request("PATCH", &uri, &json!({"nickname": "x"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(problem["code"], "USERS_PROJECTS_INVALID_BODY");

    // Explicit null is not "absent".
    let (status, _) = send(&router, json_request("PATCH", &uri, &json!({"name": null}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Field rules run for PATCH as well.
    let (status, problem) = send(&router, json_request("PATCH", &uri, &json!({"age": 12}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(problem["errors"][0]["pointer"], "/age");

    // Nothing above changed the stored record.
    let (_, fetched) = send(&router, empty_request("GET", &uri)).await;
    assert_eq!(fetched["name"], "Owner");
    assert_eq!(fetched["age"], 30);
    Ok(())
}

#[tokio::test]
async fn test_missing_content_type_is_unsupported() -> Result<()> {
    let router = create_test_router().await;
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/users")
        .body(axum::body::Body::from(
            json!({"name": "Paul", "email": "pl@atu.ie", "age": 25, "student_id": "S1234567"})
                .to_string(),
        ))
        .unwrap();
    let (status, _) = send(&router, req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    Ok(())
}

#[tokio::test]
async fn test_invalid_owner_is_rejected_and_project_kept() -> Result<()> {
    let router = create_test_router().await;
    let owner = create_user(
        &router,
        json!({"name": "Owner", "email": "owner@example.com", "age": 30, "student_id": "S1000001"}),
    )
    .await;
    let project = create_project(
        &router,
        json!({"name": "RTOS", "description": "RTOS mini project", "owner_id": owner.id}),
    )
    .await;
    let uri = format!("/api/projects/{}", project.id);

    let (status, problem) = send(
        &router,
        json_request("PATCH", &uri, &json!({"name": "Stolen", "owner_id": 4242})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(problem["errors"][0]["pointer"], "/owner_id");

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/api/projects",
            &json!({"name": "Ghost", "description": "", "owner_id": 4242}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, fetched) = send(&router, empty_request("GET", &uri)).await;
    assert_eq!(fetched["name"], "RTOS");
    assert_eq!(fetched["owner_id"], owner.id);
    Ok(())
}

#[tokio::test]
async fn test_malformed_id_is_a_problem() -> Result<()> {
    let router = create_test_router().await;

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/users/abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let ct = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert_eq!(ct, APPLICATION_PROBLEM_JSON);

    let problem = body_json(response).await;
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["code"], "USERS_PROJECTS_INVALID_PATH");
    assert_eq!(problem["instance"], "/api/users/abc");

    // Out of range for the id type.
    let (status, problem) = send(
        &router,
        json_request("PATCH", "/api/projects/99999999999", &json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["code"], "USERS_PROJECTS_INVALID_PATH");
    Ok(())
}
