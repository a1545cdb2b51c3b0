use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use taskpro_api_client::ApiResult;
use taskpro_session::{GuardOutcome, Route, RouteGuard, SessionStore};
use taskpro_tasks::TaskList;
use tracing::debug;

/// What the current frame should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Login,
    Register,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFocus {
    Tasks,
    Title,
    Description,
}

pub struct App {
    pub session: Arc<SessionStore>,
    pub tasks: TaskList,
    pub route: Route,
    guard: RouteGuard,
    /// Token the task list was last loaded for.
    loaded_token: Option<String>,
    pub name_input: String,
    pub email_input: String,
    pub password_input: String,
    pub auth_focus: AuthField,
    pub dashboard_focus: DashboardFocus,
    pub selected: usize,
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Arc<SessionStore>, tasks: TaskList) -> Self {
        let guard = RouteGuard::mount(&session);
        Self {
            session,
            tasks,
            route: Route::Dashboard,
            guard,
            loaded_token: None,
            name_input: String::new(),
            email_input: String::new(),
            password_input: String::new(),
            auth_focus: AuthField::Email,
            dashboard_focus: DashboardFocus::Tasks,
            selected: 0,
            notice: None,
            should_quit: false,
        }
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(%route, "Navigating");
        if route.is_protected() {
            self.guard = RouteGuard::mount(&self.session);
        }
        self.route = route;
        self.auth_focus = match route {
            Route::Register => AuthField::Name,
            _ => AuthField::Email,
        };
    }

    /// Resolve the current route through the guard.
    pub fn view(&mut self) -> View {
        match self.route {
            Route::Login => View::Login,
            Route::Register => View::Register,
            Route::Dashboard => match self.guard.resolve(|| View::Dashboard) {
                GuardOutcome::Loading => View::Loading,
                GuardOutcome::Render(view) => view,
                GuardOutcome::Redirect(route) => {
                    self.navigate(route);
                    View::Login
                }
            },
        }
    }

    /// Load tasks whenever the dashboard is shown for a token it has not loaded yet.
    pub async fn sync_tasks(&mut self) {
        if self.view() != View::Dashboard {
            return;
        }

        let token = self.session.token();
        if token == self.loaded_token {
            return;
        }

        self.tasks.clear();
        self.selected = 0;
        self.loaded_token = token;
        let result = self.tasks.refresh().await;
        self.check_session(result);
        self.clamp_selection();
    }

    /// Keep the selection on an existing row after the list shrinks.
    fn clamp_selection(&mut self) {
        let count = self.tasks.tasks().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    pub fn error(&self) -> Option<String> {
        self.session
            .snapshot()
            .error
            .or_else(|| self.tasks.error().map(str::to_string))
    }

    fn dismiss_error(&mut self) {
        self.session.dismiss_error();
        self.tasks.dismiss_error();
    }

    /// A rejected token ends the session; the guard then redirects to login.
    fn check_session<T>(&mut self, result: ApiResult<T>) {
        if let Err(e) = result {
            if e.is_unauthorized() {
                self.session.invalidate();
                self.tasks.clear();
                self.loaded_token = None;
            }
        }
    }

    fn logout(&mut self) {
        self.session.logout();
        self.tasks.clear();
        self.loaded_token = None;
        self.password_input.clear();
        self.navigate(Route::Login);
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.error().is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.dismiss_error();
            }
            return;
        }

        match self.view() {
            View::Loading => {}
            View::Login | View::Register => self.handle_auth_key(key).await,
            View::Dashboard => self.handle_dashboard_key(key).await,
        }
    }

    fn auth_fields(&self) -> &'static [AuthField] {
        match self.route {
            Route::Register => &[AuthField::Name, AuthField::Email, AuthField::Password],
            _ => &[AuthField::Email, AuthField::Password],
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.auth_focus {
            AuthField::Name => &mut self.name_input,
            AuthField::Email => &mut self.email_input,
            AuthField::Password => &mut self.password_input,
        }
    }

    async fn handle_auth_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                let fields = self.auth_fields();
                let index = fields.iter().position(|f| *f == self.auth_focus).unwrap_or(0);
                self.auth_focus = fields[(index + 1) % fields.len()];
            }
            KeyCode::BackTab | KeyCode::Up => {
                let fields = self.auth_fields();
                let index = fields.iter().position(|f| *f == self.auth_focus).unwrap_or(0);
                self.auth_focus = fields[(index + fields.len() - 1) % fields.len()];
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.route == Route::Login {
                    self.notice = None;
                    self.navigate(Route::Register);
                }
            }
            KeyCode::Esc => {
                if self.route == Route::Register {
                    self.navigate(Route::Login);
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Enter => self.submit_auth().await,
            KeyCode::Backspace => {
                self.focused_input().pop();
            }
            KeyCode::Char(c) => self.focused_input().push(c),
            _ => {}
        }
    }

    async fn submit_auth(&mut self) {
        if self.session.snapshot().loading {
            return;
        }

        match self.route {
            Route::Login => {
                let result = self
                    .session
                    .login(&self.email_input, &self.password_input)
                    .await;
                if result.is_ok() {
                    self.password_input.clear();
                    self.notice = None;
                    self.navigate(Route::Dashboard);
                }
            }
            Route::Register => {
                let result = self
                    .session
                    .register(&self.name_input, &self.email_input, &self.password_input)
                    .await;
                if result.is_ok() {
                    self.password_input.clear();
                    self.name_input.clear();
                    self.notice = Some("Account created. Please log in.".to_string());
                    self.navigate(Route::Login);
                }
            }
            Route::Dashboard => {}
        }
    }

    async fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match self.dashboard_focus {
            DashboardFocus::Tasks => self.handle_task_key(key).await,
            DashboardFocus::Title | DashboardFocus::Description => self.handle_draft_key(key).await,
        }
    }

    async fn handle_task_key(&mut self, key: KeyEvent) {
        let count = self.tasks.tasks().len();
        let selected_id = self.tasks.tasks().get(self.selected).map(|t| t.id);

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('n') => self.dashboard_focus = DashboardFocus::Title,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = selected_id {
                    let result = self.tasks.toggle_done(id).await;
                    self.check_session(result);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = selected_id {
                    let result = self.tasks.remove(id).await;
                    self.check_session(result);
                    self.clamp_selection();
                }
            }
            KeyCode::Char('r') => {
                let result = self.tasks.refresh().await;
                self.check_session(result);
                self.clamp_selection();
            }
            KeyCode::Char('l') => self.logout(),
            _ => {}
        }
    }

    async fn handle_draft_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.dashboard_focus = DashboardFocus::Tasks,
            KeyCode::Tab => {
                self.dashboard_focus = match self.dashboard_focus {
                    DashboardFocus::Title => DashboardFocus::Description,
                    _ => DashboardFocus::Tasks,
                };
            }
            KeyCode::Enter => {
                let result = self.tasks.submit_draft().await;
                let created = result.is_ok() && self.tasks.draft().title.is_empty();
                self.check_session(result);
                if created {
                    self.selected = 0;
                    self.dashboard_focus = DashboardFocus::Title;
                }
            }
            KeyCode::Backspace => {
                self.draft_input().pop();
            }
            KeyCode::Char(c) => self.draft_input().push(c),
            _ => {}
        }
    }

    fn draft_input(&mut self) -> &mut String {
        let draft = self.tasks.draft_mut();
        match self.dashboard_focus {
            DashboardFocus::Description => &mut draft.description,
            _ => &mut draft.title,
        }
    }
}
