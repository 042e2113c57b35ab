use std::time::Duration;
use tokio::time::Instant;

use crate::{
    client::{FormState, UserForm, UsersApi},
    models::UserRecord,
};

/// How long a success message stays visible
pub const SUCCESS_TTL: Duration = Duration::from_secs(3);

pub const FETCH_FAILED: &str = "Failed to fetch users. Make sure the backend server is running.";
pub const CREATE_FAILED: &str = "Failed to create user.";
pub const UPDATE_FAILED: &str = "Failed to update user.";
pub const DELETE_FAILED: &str = "Failed to delete user.";

pub const CREATED: &str = "User created successfully!";
pub const UPDATED: &str = "User updated successfully!";
pub const DELETED: &str = "User deleted successfully!";

/// Client-side mirror of the users collection plus the state of one user form.
///
/// Every successful mutation re-fetches the whole list. Failures leave the
/// list, the form and the edit target as they were and only set the error.
pub struct UserDashboard<A: UsersApi> {
    api: A,
    users: Vec<UserRecord>,
    loading: bool,
    form: UserForm,
    state: FormState,
    error: Option<String>,
    success: Option<(String, Instant)>,
}

impl<A: UsersApi> UserDashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            users: Vec::new(),
            loading: false,
            form: UserForm::default(),
            state: FormState::Idle,
            error: None,
            success: None,
        }
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn form(&self) -> &UserForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UserForm {
        &mut self.form
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Success text, hidden once `SUCCESS_TTL` has passed
    pub fn success_message(&self) -> Option<&str> {
        self.success
            .as_ref()
            .filter(|(_, posted_at)| posted_at.elapsed() < SUCCESS_TTL)
            .map(|(text, _)| text.as_str())
    }

    fn flash_success(&mut self, text: &str) {
        self.success = Some((text.to_string(), Instant::now()));
    }

    fn fail(&mut self, text: &str, cause: impl std::fmt::Display) {
        log::error!("{} ({})", text, cause);
        self.error = Some(text.to_string());
    }

    /// Re-fetches the full list. Returns false if the fetch failed.
    pub async fn refresh(&mut self) -> bool {
        self.loading = true;
        self.error = None;

        let ok = match self.api.list().await {
            Ok(users) => {
                self.users = users;
                true
            }
            Err(e) => {
                self.fail(FETCH_FAILED, e);
                false
            }
        };

        self.loading = false;
        ok
    }

    /// Loads a listed user into the form. Returns false for unknown ids.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        match self.users.iter().find(|u| u.id == id) {
            Some(user) => {
                self.form = UserForm::from_record(user);
                self.state = FormState::Editing { id: user.id.clone() };
                true
            }
            None => false,
        }
    }

    /// Leaves edit mode without a request
    pub fn cancel_edit(&mut self) {
        if let FormState::Editing { .. } = self.state {
            self.reset_form();
        }
    }

    fn reset_form(&mut self) {
        self.form = UserForm::default();
        self.state = FormState::Idle;
    }

    /// Creates a user from the form, or updates the one being edited
    pub async fn submit(&mut self) -> bool {
        let target = match &self.state {
            FormState::Idle => None,
            FormState::Editing { id } => Some(id.clone()),
            FormState::Submitting { .. } => return false,
        };
        let previous = std::mem::replace(
            &mut self.state,
            FormState::Submitting { target: target.clone() },
        );

        self.error = None;
        self.success = None;

        let (failed, done) = match target {
            Some(_) => (UPDATE_FAILED, UPDATED),
            None => (CREATE_FAILED, CREATED),
        };

        let result = match self.form.to_payload() {
            Ok(payload) => match &target {
                Some(id) => self.api.update(id, &payload).await,
                None => self.api.create(&payload).await,
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                log::info!("✅ {} ({})", done, user.id);
                self.flash_success(done);
                self.reset_form();
                self.refresh().await;
                true
            }
            Err(e) => {
                self.fail(failed, e);
                self.state = previous;
                false
            }
        }
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        self.error = None;

        match self.api.delete(id).await {
            Ok(user) => {
                log::info!("✅ {} ({})", DELETED, user.id);
                self.flash_success(DELETED);
                self.refresh().await;
                true
            }
            Err(e) => {
                self.fail(DELETE_FAILED, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::models::UserPayload;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        users: Mutex<Vec<UserRecord>>,
        next_id: AtomicUsize,
        down: AtomicBool,
        requests: AtomicUsize,
    }

    impl FakeApi {
        fn check(&self) -> Result<(), ClientError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(ClientError::Transport("connection refused".into()));
            }
            Ok(())
        }

        fn not_found() -> ClientError {
            ClientError::Api {
                status: 404,
                message: "User not found".into(),
            }
        }
    }

    #[async_trait]
    impl UsersApi for FakeApi {
        async fn list(&self) -> Result<Vec<UserRecord>, ClientError> {
            self.check()?;
            Ok(self.users.lock().unwrap().clone())
        }

        async fn create(&self, user: &UserPayload) -> Result<UserRecord, ClientError> {
            self.check()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
            let record = UserRecord::with_id(id, user.clone());
            self.users.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: &str, user: &UserPayload) -> Result<UserRecord, ClientError> {
            self.check()?;
            let mut users = self.users.lock().unwrap();
            let existing = users.iter_mut().find(|u| u.id == id).ok_or_else(Self::not_found)?;
            *existing = UserRecord::with_id(id.to_string(), user.clone());
            Ok(existing.clone())
        }

        async fn delete(&self, id: &str) -> Result<UserRecord, ClientError> {
            self.check()?;
            let mut users = self.users.lock().unwrap();
            let index = users.iter().position(|u| u.id == id).ok_or_else(Self::not_found)?;
            Ok(users.remove(index))
        }
    }

    fn fill(dashboard: &mut UserDashboard<FakeApi>, name: &str, hobbies: &str) {
        let form = dashboard.form_mut();
        form.name = name.to_string();
        form.age = "30".to_string();
        form.city = "X".to_string();
        form.email = "a@x.com".to_string();
        form.hobbies = hobbies.to_string();
    }

    #[tokio::test]
    async fn test_create_refetches_and_resets_form() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "reading, coding, ");

        assert!(dashboard.submit().await);
        assert_eq!(dashboard.users().len(), 1);
        assert_eq!(dashboard.users()[0].hobbies, vec!["reading", "coding"]);
        assert_eq!(dashboard.form(), &UserForm::default());
        assert_eq!(dashboard.state(), &FormState::Idle);
        assert_eq!(dashboard.success_message(), Some(CREATED));
        assert!(!dashboard.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_message_clears_after_three_seconds() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "");
        dashboard.submit().await;

        tokio::time::advance(Duration::from_millis(2900)).await;
        assert_eq!(dashboard.success_message(), Some(CREATED));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(dashboard.success_message(), None);
    }

    #[tokio::test]
    async fn test_edit_then_update_changes_only_target() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "x");
        dashboard.submit().await;
        fill(&mut dashboard, "B", "y");
        dashboard.submit().await;
        let untouched = dashboard.users()[1].clone();
        let id = dashboard.users()[0].id.clone();

        assert!(dashboard.begin_edit(&id));
        assert_eq!(dashboard.state(), &FormState::Editing { id: id.clone() });
        assert_eq!(dashboard.form().name, "A");
        assert_eq!(dashboard.form().hobbies, "x");

        dashboard.form_mut().name = "A2".to_string();
        assert!(dashboard.submit().await);

        assert_eq!(dashboard.state(), &FormState::Idle);
        assert_eq!(dashboard.success_message(), Some(UPDATED));
        assert_eq!(dashboard.users()[0].name, "A2");
        assert_eq!(dashboard.users()[1], untouched);
    }

    #[tokio::test]
    async fn test_cancel_edit_sends_nothing() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "");
        dashboard.submit().await;
        let id = dashboard.users()[0].id.clone();
        let requests = dashboard.api.requests.load(Ordering::SeqCst);

        dashboard.begin_edit(&id);
        dashboard.cancel_edit();

        assert_eq!(dashboard.state(), &FormState::Idle);
        assert_eq!(dashboard.form(), &UserForm::default());
        assert_eq!(dashboard.api.requests.load(Ordering::SeqCst), requests);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_edit_state() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "");
        dashboard.submit().await;
        let id = dashboard.users()[0].id.clone();

        dashboard.begin_edit(&id);
        dashboard.form_mut().name = "A2".to_string();
        dashboard.api.down.store(true, Ordering::SeqCst);

        assert!(!dashboard.submit().await);
        assert_eq!(dashboard.error_message(), Some(UPDATE_FAILED));
        assert_eq!(dashboard.state(), &FormState::Editing { id });
        assert_eq!(dashboard.form().name, "A2");
        assert_eq!(dashboard.users()[0].name, "A");
    }

    #[tokio::test]
    async fn test_invalid_age_fails_without_request() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "");
        dashboard.form_mut().age = "thirty".to_string();

        assert!(!dashboard.submit().await);
        assert_eq!(dashboard.error_message(), Some(CREATE_FAILED));
        assert_eq!(dashboard.api.requests.load(Ordering::SeqCst), 0);
        assert_eq!(dashboard.form().age, "thirty");
    }

    #[tokio::test]
    async fn test_delete_refetches() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "");
        dashboard.submit().await;
        let id = dashboard.users()[0].id.clone();

        assert!(dashboard.delete(&id).await);
        assert!(dashboard.users().is_empty());
        assert_eq!(dashboard.success_message(), Some(DELETED));

        assert!(!dashboard.delete(&id).await);
        assert_eq!(dashboard.error_message(), Some(DELETE_FAILED));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_list() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        fill(&mut dashboard, "A", "");
        dashboard.submit().await;

        dashboard.api.down.store(true, Ordering::SeqCst);
        assert!(!dashboard.refresh().await);
        assert_eq!(dashboard.users().len(), 1);
        assert_eq!(dashboard.error_message(), Some(FETCH_FAILED));

        dashboard.api.down.store(false, Ordering::SeqCst);
        assert!(dashboard.refresh().await);
        assert_eq!(dashboard.error_message(), None);
    }

    #[tokio::test]
    async fn test_begin_edit_unknown_id() {
        let mut dashboard = UserDashboard::new(FakeApi::default());
        assert!(!dashboard.begin_edit("missing"));
        assert_eq!(dashboard.state(), &FormState::Idle);
    }
}
