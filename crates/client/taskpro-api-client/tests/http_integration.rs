//! HTTP-level tests for the TaskPro API client against a mock server.

use serde_json::json;
use taskpro_api_client::{
    ApiClient, ApiClientBuilder, ApiError, AuthApi, CreateTaskRequest, GENERIC_FAILURE,
    LoginRequest, RegisterRequest, TaskApi, UpdateTaskRequest,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClientBuilder::new(format!("{}/api", server.uri()))
        .build()
        .unwrap();
    (server, client)
}

fn user_json() -> serde_json::Value {
    json!({
        "id": 1,
        "name": "Ada",
        "email": "ada@example.com",
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

fn task_json(id: i64, title: &str, done: bool) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "done": done,
        "userId": 1,
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn login_posts_credentials_and_decodes_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "secret" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "user": user_json(), "token": "jwt-123" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .login(&LoginRequest {
            email: "ada@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.token, "jwt-123");
    assert_eq!(response.user.name, "Ada");
}

#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = client
        .login(&LoginRequest {
            email: "ada@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid credentials");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn register_failure_without_message_uses_generic_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = client
        .register(&RegisterRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Status {
            status: 500,
            message: GENERIC_FAILURE.to_string()
        }
    );
}

#[tokio::test]
async fn list_tasks_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("Authorization", "Bearer jwt-123"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json(2, "Write report", false),
            task_json(1, "Buy milk", true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client.list_tasks("jwt-123").await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, 2);
    assert!(tasks[1].done);
}

#[tokio::test]
async fn list_tasks_normalizes_null_body_to_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let tasks = client.list_tasks("jwt-123").await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn list_tasks_normalizes_wrapped_object_to_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "tasks": [task_json(1, "Buy milk", false)] })),
        )
        .mount(&server)
        .await;

    assert!(client.list_tasks("jwt-123").await.unwrap().is_empty());
}

#[tokio::test]
async fn create_task_omits_absent_description() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(header("Authorization", "Bearer jwt-123"))
        .and(body_json(json!({ "title": "Buy milk" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json(9, "Buy milk", false)))
        .expect(1)
        .mount(&server)
        .await;

    let task = client
        .create_task(
            "jwt-123",
            &CreateTaskRequest {
                title: "Buy milk".into(),
                description: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(task.id, 9);
}

#[tokio::test]
async fn update_task_puts_partial_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/tasks/4"))
        .and(body_json(json!({ "done": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(4, "Buy milk", true)))
        .expect(1)
        .mount(&server)
        .await;

    let task = client
        .update_task("jwt-123", 4, &UpdateTaskRequest::done(true))
        .await
        .unwrap();

    assert!(task.done);
}

#[tokio::test]
async fn update_task_with_undecodable_success_body_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/tasks/4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client
        .update_task("jwt-123", 4, &UpdateTaskRequest::done(true))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn delete_task_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/tasks/4"))
        .and(header("Authorization", "Bearer jwt-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_task("jwt-123", 4).await.unwrap();
}

#[tokio::test]
async fn delete_task_not_found_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/tasks/4"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Task not found" })),
        )
        .mount(&server)
        .await;

    let err = client.delete_task("jwt-123", 4).await.unwrap_err();
    assert_eq!(err.to_string(), "Task not found");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client = ApiClientBuilder::new("http://127.0.0.1:9").build().unwrap();

    let err = client.list_tasks("jwt-123").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(!err.to_string().is_empty());
}

fn registration() -> RegisterRequest {
    RegisterRequest {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: "secret".into(),
    }
}

#[tokio::test]
async fn register_accepts_created_with_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let created = client.register(&registration()).await.unwrap();

    assert_eq!(created, None);
}

#[tokio::test]
async fn register_accepts_created_with_bare_user() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json()))
        .mount(&server)
        .await;

    let created = client.register(&registration()).await.unwrap();

    assert_eq!(created.map(|u| u.email), Some("ada@example.com".to_string()));
}
