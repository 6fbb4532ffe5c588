use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::analysis::AnalysisView;
use crate::api::{ApiClient, ApiError, ANALYZE_FAILED, RECOMMEND_FAILED};
use crate::auth::{LoginView, SignUpView, LOGIN_FAILED, REGISTER_FAILED, REGISTER_SUCCEEDED};
use crate::models::{LoginResponse, RecommendationResult};
use crate::profile::{ProfileTab, ProfileView, PROFILE_SAVED, PROFILE_SAVE_FAILED};
use crate::recommend::RecommendationView;
use crate::session::{SessionError, SessionStore};

/// Which screen is showing. Exactly one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Main,
    Login,
    SignUp,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Login,
    Register,
    Analysis,
    Recommendation,
    ProfileSave,
}

impl Task {
    /// The screen whose view receives this task's result.
    fn screen(self) -> Screen {
        match self {
            Task::Login => Screen::Login,
            Task::Register => Screen::SignUp,
            Task::Analysis | Task::Recommendation => Screen::Main,
            Task::ProfileSave => Screen::Profile,
        }
    }
}

#[derive(Debug)]
pub enum TaskOutput {
    Login(Result<LoginResponse, ApiError>),
    Register(Result<Value, ApiError>),
    Analysis(Result<Value, ApiError>),
    Recommendation(Result<RecommendationResult, ApiError>),
    ProfileSave(Result<Value, ApiError>),
}

impl TaskOutput {
    fn task(&self) -> Task {
        match self {
            TaskOutput::Login(_) => Task::Login,
            TaskOutput::Register(_) => Task::Register,
            TaskOutput::Analysis(_) => Task::Analysis,
            TaskOutput::Recommendation(_) => Task::Recommendation,
            TaskOutput::ProfileSave(_) => Task::ProfileSave,
        }
    }
}

#[derive(Debug)]
pub struct AppEvent {
    id: u64,
    output: TaskOutput,
}

/// Pulls the stored user record and display name out of a login response.
pub fn login_identity(response: LoginResponse) -> Option<(Value, String)> {
    let user = response.user?;
    let username = user.get("username")?.as_str()?.trim().to_string();
    if username.is_empty() {
        return None;
    }
    Some((user, username))
}

/// Notifies the backend, then clears every persisted key whether or not the
/// notification went through. Returns whether the backend acknowledged.
pub async fn logout(api: &ApiClient, store: &SessionStore) -> Result<bool, SessionError> {
    let acknowledged = match api.logout().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "logout notification failed, clearing local session anyway");
            false
        }
    };
    store.clear()?;
    Ok(acknowledged)
}

/// Top-level router: owns every view, starts requests and applies their
/// results. Results come back as `AppEvent`s on the channel returned by `new`.
pub struct App {
    api: ApiClient,
    store: SessionStore,
    runtime: Handle,
    events: UnboundedSender<AppEvent>,
    next_id: u64,
    in_flight: HashMap<Task, (u64, CancellationToken)>,
    pending_logout: Option<JoinHandle<()>>,
    screen: Screen,
    user_name: Option<String>,
    notice: Option<String>,
    pub login: LoginView,
    pub signup: SignUpView,
    pub analysis: AnalysisView,
    pub recommendations: RecommendationView,
    pub profile: ProfileView,
}

impl App {
    pub fn new(
        api: ApiClient,
        store: SessionStore,
        runtime: Handle,
        session_max_age: chrono::Duration,
    ) -> (Self, UnboundedReceiver<AppEvent>) {
        let user_name = match store.current_user(session_max_age, Utc::now()) {
            Ok(user) => user.map(|u| u.username),
            Err(err) => {
                warn!(error = %err, "could not read stored session");
                None
            }
        };
        if let Some(name) = &user_name {
            info!(user = %name, "restored session");
        }

        let (events, rx) = unbounded_channel();
        let app = Self {
            api,
            store,
            runtime,
            events,
            next_id: 0,
            in_flight: HashMap::new(),
            pending_logout: None,
            screen: Screen::Main,
            user_name,
            notice: None,
            login: LoginView::default(),
            signup: SignUpView::default(),
            analysis: AnalysisView::default(),
            recommendations: RecommendationView::default(),
            profile: ProfileView::default(),
        };
        (app, rx)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_name.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_busy(&self, task: Task) -> bool {
        self.in_flight.contains_key(&task)
    }

    /// Switches screens. Requests owned by the screen being left are
    /// cancelled so their results never land on a dismissed view.
    pub fn navigate(&mut self, screen: Screen) {
        let screen = if screen == Screen::Profile && !self.is_authenticated() {
            Screen::Login
        } else {
            screen
        };
        if screen == self.screen {
            return;
        }

        let leaving = self.screen;
        let owned: Vec<Task> = self
            .in_flight
            .keys()
            .copied()
            .filter(|task| task.screen() == leaving)
            .collect();
        for task in owned {
            self.cancel(task);
        }
        debug!(from = ?leaving, to = ?screen, "navigate");
        self.screen = screen;
    }

    fn cancel(&mut self, task: Task) {
        if let Some((_, token)) = self.in_flight.remove(&task) {
            token.cancel();
            debug!(?task, "cancelled in-flight request");
        }
        match task {
            Task::Login => self.login.abandon(),
            Task::Register => self.signup.abandon(),
            Task::Analysis => self.analysis.abandon(),
            Task::Recommendation => self.recommendations.abandon(),
            Task::ProfileSave => self.profile.edit.abandon(),
        }
    }

    pub fn cancel_all(&mut self) {
        let tasks: Vec<Task> = self.in_flight.keys().copied().collect();
        for task in tasks {
            self.cancel(task);
        }
    }

    fn spawn<F>(&mut self, task: Task, request: F)
    where
        F: Future<Output = TaskOutput> + Send + 'static,
    {
        self.next_id += 1;
        let id = self.next_id;
        let token = CancellationToken::new();
        self.in_flight.insert(task, (id, token.clone()));

        let events = self.events.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(?task, id, "request dropped after cancellation");
                }
                output = request => {
                    let _ = events.send(AppEvent { id, output });
                }
            }
        });
    }

    // --- Actions ---

    pub fn submit_login(&mut self) {
        let Some(credentials) = self.login.begin_submit() else { return };
        let api = self.api.clone();
        self.spawn(Task::Login, async move { TaskOutput::Login(api.login(&credentials).await) });
    }

    pub fn submit_signup(&mut self) {
        let Some(registration) = self.signup.begin_submit() else { return };
        let api = self.api.clone();
        self.spawn(Task::Register, async move {
            TaskOutput::Register(api.register(&registration).await)
        });
    }

    pub fn submit_analysis(&mut self) {
        let Some(request) = self.analysis.begin(self.is_authenticated()) else { return };
        let api = self.api.clone();
        self.spawn(Task::Analysis, async move {
            TaskOutput::Analysis(api.analyze_direct(&request).await)
        });
    }

    pub fn request_recommendations(&mut self) {
        let Some(request) = self.recommendations.begin(&self.analysis.input) else { return };
        let api = self.api.clone();
        self.spawn(Task::Recommendation, async move {
            TaskOutput::Recommendation(api.recommend_direct(&request).await)
        });
    }

    pub fn submit_profile_edit(&mut self) {
        let Some(update) = self.profile.edit.begin_submit() else { return };
        let api = self.api.clone();
        self.spawn(Task::ProfileSave, async move {
            TaskOutput::ProfileSave(api.edit_profile(&update).await)
        });
    }

    pub fn select_profile_tab(&mut self, tab: ProfileTab) {
        if self.profile.select(tab) {
            self.logout();
        }
    }

    /// Clears persisted state right away, then tells the backend in the
    /// background. The notification's outcome only reaches the log.
    /// If the session file cannot be removed nothing else changes and the
    /// notice reports the failure.
    pub fn logout(&mut self) {
        self.cancel_all();
        if let Err(err) = self.store.clear() {
            error!(error = %err, path = %self.store.path().display(), "failed to clear session");
            self.notice = Some(format!("Could not log out: {}", err));
            return;
        }

        let api = self.api.clone();
        self.pending_logout = Some(self.runtime.spawn(async move {
            match api.logout().await {
                Ok(()) => debug!("backend acknowledged logout"),
                Err(err) => warn!(error = %err, "logout notification failed"),
            }
        }));

        self.user_name = None;
        self.login = LoginView::default();
        self.signup = SignUpView::default();
        self.analysis.reset();
        self.recommendations.reset();
        self.profile.reset();
        self.screen = Screen::Main;
        self.notice = Some("You have been logged out.".to_string());
        info!("logged out");
    }

    /// The backend logout notification, if one may still be running. Awaited
    /// briefly on shutdown so quitting right after logout still delivers it.
    pub fn take_pending_logout(&mut self) -> Option<JoinHandle<()>> {
        self.pending_logout.take()
    }

    fn on_auth_success(&mut self, username: String) {
        self.user_name = Some(username);
        self.navigate(Screen::Main);
    }

    // --- Results ---

    /// Applies a finished request. Results of requests that were cancelled or
    /// superseded are discarded.
    pub fn handle(&mut self, event: AppEvent) {
        let task = event.output.task();
        let current = self.in_flight.get(&task).map(|(id, _)| *id);
        if current != Some(event.id) {
            debug!(?task, id = event.id, "discarding stale result");
            return;
        }
        self.in_flight.remove(&task);

        match event.output {
            TaskOutput::Login(result) => self.finish_login(result),
            TaskOutput::Register(result) => match result {
                Ok(_) => {
                    info!("registration succeeded");
                    self.signup.succeed();
                    self.notice = Some(REGISTER_SUCCEEDED.to_string());
                    self.navigate(Screen::Login);
                }
                Err(err) => self.signup.fail(err.user_message(REGISTER_FAILED)),
            },
            TaskOutput::Analysis(result) => {
                self.analysis.finish(result.map_err(|e| e.user_message(ANALYZE_FAILED)));
            }
            TaskOutput::Recommendation(result) => {
                self.recommendations
                    .finish(result.map_err(|e| e.user_message(RECOMMEND_FAILED)));
            }
            TaskOutput::ProfileSave(result) => match result {
                Ok(_) => {
                    self.profile.edit.finish(Ok(()));
                    self.notice = Some(PROFILE_SAVED.to_string());
                }
                Err(err) => self
                    .profile
                    .edit
                    .finish(Err(err.user_message(PROFILE_SAVE_FAILED))),
            },
        }
    }

    fn finish_login(&mut self, result: Result<LoginResponse, ApiError>) {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.login.fail(err.user_message(LOGIN_FAILED));
                return;
            }
        };
        let Some((user, username)) = login_identity(response) else {
            error!("login response did not include a username");
            self.login.fail(LOGIN_FAILED.to_string());
            return;
        };
        if let Err(err) = self.store.save_login(&user, Utc::now()) {
            error!(error = %err, "failed to persist session");
            self.login.fail(format!("Could not save your session: {}", err));
            return;
        }

        info!(user = %username, "login succeeded");
        self.login.succeed();
        self.notice = Some(format!("Login successful! Welcome back, {}", username));
        self.on_auth_success(username);
    }
}
