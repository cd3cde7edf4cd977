//! Search and delete state for the dashboard.
//!
//! Keystrokes update `search_text` immediately; the query only moves to
//! `debounced_query` once it has been stable for the debounce delay, and each
//! change of the debounced query triggers one fetch. Fetches are tagged with a
//! generation so a slow answer for an older query never replaces newer results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, User, UserId, UsersBackend};

pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

pub const NETWORK_ERROR_MESSAGE: &str = "Unable to connect to the server";
pub const USER_DELETED_NOTICE: &str = "User deleted successfully";

/// An open "are you sure" prompt for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub user: User,
    pub is_deleting: bool,
    pub error: Option<String>,
}

/// Snapshot rendered by the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub search_text: String,
    pub debounced_query: String,
    pub users: Vec<User>,
    pub is_loading: bool,
    pub load_error: Option<String>,
    pub pending_delete: Option<DeleteConfirmation>,
    pub notice: Option<String>,
}

fn user_facing_message(err: &ApiError) -> String {
    if err.is_network() {
        NETWORK_ERROR_MESSAGE.to_string()
    } else {
        err.message.clone()
    }
}

struct Inner {
    backend: Arc<dyn UsersBackend>,
    debounce: Duration,
    state: watch::Sender<DashboardState>,
    generation: AtomicU64,
    debounce_timer: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// Fetch for the current debounced query; results are dropped if another
    /// fetch started in the meantime.
    async fn load(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.state.borrow().debounced_query.clone();
        self.state.send_modify(|s| s.is_loading = true);

        let result = self
            .backend
            .fetch_users(Some(query.as_str()).filter(|q| !q.is_empty()))
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(query = %query, generation, "Discarding results of a superseded fetch");
            return;
        }

        self.state.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(users) => {
                    debug!(query = %query, "Loaded {} users", users.len());
                    s.users = users;
                    s.load_error = None;
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Failed to load users");
                    s.load_error = Some(user_facing_message(&e));
                }
            }
        });
    }

    /// Promote `text` to the debounced query and mark the list as loading.
    /// Returns false when the query is unchanged.
    fn commit_query(&self, text: String) -> bool {
        self.state.send_if_modified(|s| {
            if s.debounced_query == text {
                return false;
            }
            s.debounced_query = text;
            s.is_loading = true;
            true
        })
    }
}

/// Owns dashboard state and publishes every change through a watch channel.
pub struct DashboardController {
    inner: Arc<Inner>,
}

impl DashboardController {
    pub fn new(backend: Arc<dyn UsersBackend>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                debounce,
                state,
                generation: AtomicU64::new(0),
                debounce_timer: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Record a keystroke and restart the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.send_if_modified(|s| {
            if s.search_text == text {
                return false;
            }
            s.search_text = text.clone();
            true
        });

        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.commit_query(text) {
                // Detached so the next keystroke cannot abort an in-flight fetch;
                // generations decide whose result sticks.
                tokio::spawn(async move { inner.load().await });
            }
        });

        if let Some(previous) = self.inner.debounce_timer.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Re-fetch the list for the current debounced query.
    #[instrument(name = "users_dashboard.controller.refresh", skip(self))]
    pub async fn refresh(&self) {
        self.inner.load().await;
    }

    /// Open the confirmation for a user in the visible list.
    /// Returns false when the id is not on screen.
    pub fn request_delete(&self, id: UserId) -> bool {
        self.inner.state.send_if_modified(|s| {
            if s.pending_delete.as_ref().is_some_and(|p| p.is_deleting) {
                return false;
            }
            let Some(user) = s.users.iter().find(|u| u.id == id).cloned() else {
                return false;
            };
            s.pending_delete = Some(DeleteConfirmation {
                user,
                is_deleting: false,
                error: None,
            });
            s.notice = None;
            true
        })
    }

    /// Close the confirmation; ignored while the delete is in flight.
    pub fn cancel_delete(&self) {
        self.inner.state.send_if_modified(|s| {
            let closable = s.pending_delete.as_ref().is_some_and(|p| !p.is_deleting);
            if closable {
                s.pending_delete = None;
            }
            closable
        });
    }

    /// Delete the user under confirmation.
    ///
    /// On success the row disappears at once, the prompt closes and the list
    /// is fetched again. On failure the prompt stays open with the error so
    /// the user can retry or cancel.
    #[instrument(name = "users_dashboard.controller.confirm_delete", skip(self))]
    pub async fn confirm_delete(&self) -> Result<(), ApiError> {
        let mut target = None;
        self.inner.state.send_if_modified(|s| match s.pending_delete.as_mut() {
            Some(p) if !p.is_deleting => {
                p.is_deleting = true;
                p.error = None;
                target = Some(p.user.id);
                true
            }
            _ => false,
        });
        let Some(id) = target else {
            debug!("No delete awaiting confirmation");
            return Ok(());
        };

        match self.inner.backend.delete_user(id).await {
            Ok(()) => {
                info!(user_id = id, "Deleted user");
                self.inner.state.send_modify(|s| {
                    s.users.retain(|u| u.id != id);
                    s.pending_delete = None;
                    s.notice = Some(USER_DELETED_NOTICE.to_string());
                });
                self.inner.load().await;
                Ok(())
            }
            Err(e) => {
                warn!(user_id = id, error = %e, "Delete failed");
                let message = user_facing_message(&e);
                self.inner.state.send_modify(|s| {
                    if let Some(p) = s.pending_delete.as_mut() {
                        p.is_deleting = false;
                        p.error = Some(message);
                    }
                });
                Err(e)
            }
        }
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.debounce_timer.lock().take() {
            timer.abort();
        }
    }
}
