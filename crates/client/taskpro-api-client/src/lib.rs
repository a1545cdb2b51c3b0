//! HTTP client adapter for the TaskPro task API.
//!
//! Every call attaches `Content-Type: application/json`; calls that need a
//! session also attach `Authorization: Bearer <token>`. Failed responses are
//! reduced to a single human-readable [`ApiError`].
//!
//! The [`AuthApi`] and [`TaskApi`] traits are the seams the session and task
//! crates depend on; [`ApiClient`] implements both.

mod client;
mod error;
mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ApiError, ApiResult, GENERIC_FAILURE};
pub use types::{
    AuthResponse, CreateTaskRequest, LoginRequest, RegisterRequest, Task, TaskId,
    UpdateTaskRequest, User, UserId,
};

use async_trait::async_trait;

/// Unauthenticated account endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    /// Create an account. Succeeds on any 2xx; the created user is returned
    /// when the server sends one back.
    async fn register(&self, request: &RegisterRequest) -> ApiResult<Option<User>>;
}

/// Task endpoints; every call needs a bearer token.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetch all tasks. Malformed list payloads come back as an empty list.
    async fn list_tasks(&self, token: &str) -> ApiResult<Vec<Task>>;

    async fn create_task(&self, token: &str, request: &CreateTaskRequest) -> ApiResult<Task>;

    async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        request: &UpdateTaskRequest,
    ) -> ApiResult<Task>;

    async fn delete_task(&self, token: &str, id: TaskId) -> ApiResult<()>;
}
