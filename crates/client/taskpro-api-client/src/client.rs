//! reqwest-backed implementation of the TaskPro API.

use crate::error::{ApiError, ApiResult, GENERIC_FAILURE};
use crate::types::{
    AuthResponse, CreateTaskRequest, ErrorBody, LoginRequest, RegisterRequest, Task, TaskId,
    UpdateTaskRequest, User,
};
use crate::{AuthApi, TaskApi};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    http_client: Option<Client>,
}

impl ApiClientBuilder {
    /// Create a builder for the API rooted at `base_url`, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_client: None,
        }
    }

    /// Reuse an existing HTTP client instead of creating a new one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> ApiResult<ApiClient> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = match self.http_client {
            Some(client) => client,
            None => Client::builder().build()?,
        };

        Ok(ApiClient { client, base_url })
    }
}

/// One-shot request/response client. No retries, caching or explicit timeouts.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    /// Send the request and return the raw body of a 2xx response.
    async fn send(&self, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), len = body.len(), "Request succeeded");
            Ok(body.to_vec())
        } else {
            let message = error_message(&body);
            debug!(status = status.as_u16(), error = %message, "Request failed");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send_json<B, T>(&self, builder: RequestBuilder, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send(builder.json(body)).await?;
        decode(&bytes)
    }
}

/// Pull the server-supplied `message`, falling back to the generic text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    if body.is_empty() {
        return Err(ApiError::Decode("empty response body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Anything that is not a JSON array of valid tasks becomes an empty list.
fn normalize_task_list(body: &[u8]) -> Vec<Task> {
    match serde_json::from_slice::<Vec<Task>>(body) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "Task list response was not a list of tasks, using empty list");
            Vec::new()
        }
    }
}

/// Any 2xx from `/register` is a success. The body may be empty, a bare user
/// or a login-style `{user, token}`.
fn registered_user(body: &[u8]) -> Option<User> {
    if body.is_empty() {
        return None;
    }
    if let Ok(AuthResponse { user, .. }) = serde_json::from_slice(body) {
        return Some(user);
    }
    match serde_json::from_slice::<User>(body) {
        Ok(user) => Some(user),
        Err(e) => {
            debug!(error = %e, "Registration response carried no user");
            None
        }
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let builder = self.request(Method::POST, "/login", None);
        self.send_json(builder, request).await
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn register(&self, request: &RegisterRequest) -> ApiResult<Option<User>> {
        let builder = self.request(Method::POST, "/register", None).json(request);
        let body = self.send(builder).await?;
        Ok(registered_user(&body))
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    #[instrument(skip(self, token))]
    async fn list_tasks(&self, token: &str) -> ApiResult<Vec<Task>> {
        let body = self
            .send(self.request(Method::GET, "/tasks", Some(token)))
            .await?;
        Ok(normalize_task_list(&body))
    }

    #[instrument(skip(self, token, request))]
    async fn create_task(&self, token: &str, request: &CreateTaskRequest) -> ApiResult<Task> {
        let builder = self.request(Method::POST, "/tasks", Some(token));
        self.send_json(builder, request).await
    }

    #[instrument(skip(self, token, request))]
    async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        request: &UpdateTaskRequest,
    ) -> ApiResult<Task> {
        let builder = self.request(Method::PUT, &format!("/tasks/{}", id), Some(token));
        self.send_json(builder, request).await
    }

    #[instrument(skip(self, token))]
    async fn delete_task(&self, token: &str, id: TaskId) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("/tasks/{}", id), Some(token)))
            .await?;
        Ok(())
    }
}
