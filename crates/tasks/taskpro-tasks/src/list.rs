//! The task list controller.

use crate::stats::TaskStats;
use std::collections::HashSet;
use std::sync::Arc;
use taskpro_api_client::{ApiResult, CreateTaskRequest, Task, TaskApi, TaskId, UpdateTaskRequest};
use taskpro_session::SessionStore;
use tracing::{debug, info, warn};

/// Unsaved contents of the task creation form. An empty description means none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

impl Draft {
    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

/// The authenticated user's tasks, newest first.
///
/// Every change goes through the server and the local list is only updated
/// from its responses. A failed call leaves the list untouched and records
/// the error text in [`error`](Self::error). Without a session token the
/// remote operations do nothing.
pub struct TaskList {
    api: Arc<dyn TaskApi>,
    session: Arc<SessionStore>,
    tasks: Vec<Task>,
    draft: Draft,
    loading: bool,
    error: Option<String>,
}

impl TaskList {
    pub fn new(api: Arc<dyn TaskApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            tasks: Vec::new(),
            draft: Draft::default(),
            loading: false,
            error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Forget everything held for the previous session.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.draft.clear();
        self.loading = false;
        self.error = None;
    }

    /// Replace the local list with the server's.
    pub async fn refresh(&mut self) -> ApiResult<()> {
        let Some(token) = self.token() else {
            return Ok(());
        };

        self.loading = true;
        self.error = None;

        let result = self.api.list_tasks(&token).await;
        self.loading = false;

        let tasks = self.record(result)?;
        self.tasks = dedup_by_id(tasks);
        info!(count = self.tasks.len(), "Task list refreshed");
        Ok(())
    }

    /// Create a task and put it at the top of the list.
    ///
    /// A title that is empty after trimming is ignored and nothing is sent.
    pub async fn create(&mut self, title: &str, description: Option<&str>) -> ApiResult<()> {
        let title = title.trim();
        if title.is_empty() {
            debug!("Ignoring task with blank title");
            return Ok(());
        }
        let Some(token) = self.token() else {
            return Ok(());
        };

        let request = CreateTaskRequest {
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };

        let result = self.api.create_task(&token, &request).await;
        let created = self.record(result)?;

        info!(task_id = created.id, "Task created");
        self.tasks.retain(|t| t.id != created.id);
        self.tasks.insert(0, created);
        self.draft.clear();
        Ok(())
    }

    /// Create a task from the current draft.
    pub async fn submit_draft(&mut self) -> ApiResult<()> {
        let Draft { title, description } = self.draft.clone();
        self.create(&title, Some(&description)).await
    }

    /// Flip `done` on the server and take its copy of the task.
    pub async fn toggle_done(&mut self, id: TaskId) -> ApiResult<()> {
        let Some(current) = self.get(id).map(|t| t.done) else {
            debug!(task_id = id, "Toggle for unknown task ignored");
            return Ok(());
        };
        let Some(token) = self.token() else {
            return Ok(());
        };

        let result = self
            .api
            .update_task(&token, id, &UpdateTaskRequest::done(!current))
            .await;
        let updated = self.record(result)?;

        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Delete on the server, then drop the local entry.
    pub async fn remove(&mut self, id: TaskId) -> ApiResult<()> {
        let Some(token) = self.token() else {
            return Ok(());
        };

        let result = self.api.delete_task(&token, id).await;
        self.record(result)?;

        self.tasks.retain(|t| t.id != id);
        info!(task_id = id, "Task deleted");
        Ok(())
    }

    fn token(&self) -> Option<String> {
        let token = self.session.token();
        if token.is_none() {
            debug!("No session token, skipping task request");
        }
        token
    }

    fn record<T>(&mut self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(e) = &result {
            warn!(error = %e, "Task request failed");
            self.error = Some(e.to_string());
        }
        result
    }
}

fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let before = tasks.len();
    let tasks: Vec<Task> = tasks.into_iter().filter(|t| seen.insert(t.id)).collect();
    if tasks.len() != before {
        warn!(dropped = before - tasks.len(), "Server returned duplicate task ids");
    }
    tasks
}
