//! Task list controller tests against an in-memory task server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taskpro_api_client::{
    ApiError, ApiResult, AuthApi, AuthResponse, CreateTaskRequest, LoginRequest, RegisterRequest,
    Task, TaskApi, TaskId, UpdateTaskRequest, User,
};
use taskpro_session::{MemoryStorage, PersistedSession, SessionStore};
use taskpro_tasks::{TaskList, TaskStats};

const TOKEN: &str = "jwt-1";

fn timestamp() -> DateTime<Utc> {
    "2024-05-01T10:00:00Z".parse().unwrap()
}

fn task(id: TaskId, title: &str, done: bool) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        done,
        user_id: 1,
        created_at: timestamp(),
    }
}

struct NoAuth;

#[async_trait]
impl AuthApi for NoAuth {
    async fn login(&self, _request: &LoginRequest) -> ApiResult<AuthResponse> {
        Err(ApiError::Transport("offline".into()))
    }

    async fn register(&self, _request: &RegisterRequest) -> ApiResult<Option<User>> {
        Err(ApiError::Transport("offline".into()))
    }
}

/// Server-side task table. `fail_next` makes the next call fail with that error.
struct FakeTasks {
    rows: Mutex<Vec<Task>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
    fail_next: Mutex<Option<ApiError>>,
    last_create: Mutex<Option<CreateTaskRequest>>,
}

impl FakeTasks {
    fn with_rows(rows: Vec<Task>) -> Self {
        Self {
            rows: Mutex::new(rows),
            next_id: AtomicI64::new(100),
            calls: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
            last_create: Mutex::new(None),
        }
    }

    fn fail_next(&self, error: ApiError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self, token: &str) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }
        assert_eq!(token, TOKEN);
        Ok(())
    }
}

#[async_trait]
impl TaskApi for FakeTasks {
    async fn list_tasks(&self, token: &str) -> ApiResult<Vec<Task>> {
        self.begin(token)?;
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn create_task(&self, token: &str, request: &CreateTaskRequest) -> ApiResult<Task> {
        self.begin(token)?;
        *self.last_create.lock().unwrap() = Some(request.clone());

        let mut created = task(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            &request.title,
            false,
        );
        created.description = request.description.clone();
        self.rows.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        token: &str,
        id: TaskId,
        request: &UpdateTaskRequest,
    ) -> ApiResult<Task> {
        self.begin(token)?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Task not found".into(),
            })?;
        if let Some(done) = request.done {
            row.done = done;
        }
        // The server's copy carries fields the client did not send.
        row.description = Some("updated by server".into());
        Ok(row.clone())
    }

    async fn delete_task(&self, token: &str, id: TaskId) -> ApiResult<()> {
        self.begin(token)?;
        self.rows.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}

fn session(logged_in: bool) -> Arc<SessionStore> {
    let storage = if logged_in {
        let record = PersistedSession {
            user: User {
                id: 1,
                name: "Ada".into(),
                email: "ada@example.com".into(),
                created_at: timestamp(),
            },
            token: TOKEN.into(),
        };
        MemoryStorage::with_record(serde_json::to_string(&record).unwrap())
    } else {
        MemoryStorage::new()
    };

    let store = SessionStore::new(Arc::new(NoAuth), Arc::new(storage));
    store.restore();
    Arc::new(store)
}

async fn loaded(rows: Vec<Task>) -> (Arc<FakeTasks>, TaskList) {
    let api = Arc::new(FakeTasks::with_rows(rows));
    let mut list = TaskList::new(api.clone(), session(true));
    list.refresh().await.unwrap();
    (api, list)
}

#[tokio::test]
async fn refresh_replaces_collection() {
    let (_, list) = loaded(vec![task(2, "Write report", false), task(1, "Buy milk", true)]).await;

    let ids: Vec<_> = list.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(!list.is_loading());
    assert_eq!(list.error(), None);
}

#[tokio::test]
async fn refresh_drops_duplicate_ids() {
    let (_, list) = loaded(vec![task(1, "first", false), task(1, "second", true)]).await;

    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.tasks()[0].title, "first");
}

#[tokio::test]
async fn failed_refresh_keeps_previous_tasks() {
    let (api, mut list) = loaded(vec![task(1, "Buy milk", false)]).await;

    api.fail_next(ApiError::Transport("connection refused".into()));
    let result = list.refresh().await;

    assert!(result.is_err());
    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.error(), Some("connection refused"));
    assert!(!list.is_loading());
}

#[tokio::test]
async fn blank_titles_are_ignored() {
    let (api, mut list) = loaded(vec![task(1, "Buy milk", false)]).await;
    let calls = api.calls();

    list.create("", None).await.unwrap();
    list.create("   ", Some("details")).await.unwrap();

    assert_eq!(api.calls(), calls);
    assert_eq!(list.tasks().len(), 1);
}

#[tokio::test]
async fn create_prepends_server_task_and_clears_draft() {
    let (api, mut list) = loaded(vec![task(1, "Write report", false)]).await;

    list.draft_mut().title = "  Buy milk ".into();
    list.draft_mut().description = "   ".into();
    list.submit_draft().await.unwrap();

    assert_eq!(list.tasks().len(), 2);
    assert_eq!(list.tasks()[0].id, 100);
    assert_eq!(list.tasks()[0].title, "Buy milk");
    assert_eq!(list.draft().title, "");

    let sent = api.last_create.lock().unwrap().clone().unwrap();
    assert_eq!(sent.title, "Buy milk");
    assert_eq!(sent.description, None);
}

#[tokio::test]
async fn failed_create_keeps_draft_and_tasks() {
    let (api, mut list) = loaded(vec![]).await;

    list.draft_mut().title = "Buy milk".into();
    api.fail_next(ApiError::Status {
        status: 400,
        message: "Title is required".into(),
    });

    assert!(list.submit_draft().await.is_err());
    assert!(list.tasks().is_empty());
    assert_eq!(list.draft().title, "Buy milk");
    assert_eq!(list.error(), Some("Title is required"));
}

#[tokio::test]
async fn toggle_takes_server_representation() {
    let (_, mut list) = loaded(vec![task(1, "Buy milk", false)]).await;

    list.toggle_done(1).await.unwrap();

    let toggled = list.get(1).unwrap();
    assert!(toggled.done);
    assert_eq!(toggled.description.as_deref(), Some("updated by server"));

    list.toggle_done(1).await.unwrap();
    assert!(!list.get(1).unwrap().done);
}

#[tokio::test]
async fn toggle_unknown_task_is_a_no_op() {
    let (api, mut list) = loaded(vec![task(1, "Buy milk", false)]).await;
    let before = list.tasks().to_vec();
    let calls = api.calls();

    list.toggle_done(99).await.unwrap();

    assert_eq!(api.calls(), calls);
    assert_eq!(list.tasks(), before.as_slice());
}

#[tokio::test]
async fn failed_toggle_leaves_task_unchanged() {
    let (api, mut list) = loaded(vec![task(1, "Buy milk", false)]).await;

    api.fail_next(ApiError::Transport("timeout".into()));
    assert!(list.toggle_done(1).await.is_err());

    assert!(!list.get(1).unwrap().done);
    assert_eq!(list.error(), Some("timeout"));
}

#[tokio::test]
async fn remove_drops_entry_after_confirmation() {
    let (api, mut list) = loaded(vec![task(2, "Write report", false), task(1, "Buy milk", true)]).await;

    api.fail_next(ApiError::Status {
        status: 500,
        message: "Request failed".into(),
    });
    assert!(list.remove(1).await.is_err());
    assert_eq!(list.tasks().len(), 2);

    list.dismiss_error();
    list.remove(1).await.unwrap();
    assert_eq!(list.tasks().len(), 1);
    assert_eq!(list.tasks()[0].id, 2);
    assert_eq!(list.error(), None);
}

#[tokio::test]
async fn operations_without_session_make_no_requests() {
    let api = Arc::new(FakeTasks::with_rows(vec![task(1, "Buy milk", false)]));
    let mut list = TaskList::new(api.clone(), session(false));

    list.refresh().await.unwrap();
    list.create("Buy milk", None).await.unwrap();
    list.remove(1).await.unwrap();

    assert_eq!(api.calls(), 0);
    assert!(list.tasks().is_empty());
}

#[tokio::test]
async fn stats_follow_the_collection() {
    let (_, list) = loaded(vec![]).await;
    assert_eq!(
        list.stats(),
        TaskStats {
            total: 0,
            completed: 0,
            pending: 0,
            completion_rate: 0
        }
    );

    let (_, list) = loaded(vec![
        task(3, "a", true),
        task(2, "b", true),
        task(1, "c", false),
    ])
    .await;
    assert_eq!(
        list.stats(),
        TaskStats {
            total: 3,
            completed: 2,
            pending: 1,
            completion_rate: 67
        }
    );
}

#[tokio::test]
async fn clear_resets_everything() {
    let (_, mut list) = loaded(vec![task(1, "Buy milk", false)]).await;
    list.draft_mut().title = "half typed".into();

    list.clear();

    assert!(list.tasks().is_empty());
    assert_eq!(list.draft().title, "");
    assert_eq!(list.stats(), TaskStats::default());
}
