//! Per-session state behind the question management page.

use std::collections::HashMap;
use std::sync::{self, Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::form::QuestionForm;
use super::notification::NotificationSurface;
use crate::api::{ApiError, Question, QuestionApi};

pub const ADDED: &str = "Question added successfully!";
pub const DELETED: &str = "Question deleted successfully!";
pub const LOAD_FAILED: &str = "Failed to load questions";
pub const SAVE_FAILED: &str = "Failed to save question. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete question";

/// What the web layer has to do after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The API rejected the token; the admin has to log in again.
    Reauthenticate,
}

#[derive(Debug, Default)]
pub struct Workspace {
    questions: Vec<Question>,
    form: QuestionForm,
    notices: NotificationSurface,
    loaded: bool,
}

impl Workspace {
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn form(&self) -> &QuestionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut QuestionForm {
        &mut self.form
    }

    pub fn notices(&self) -> &NotificationSurface {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NotificationSurface {
        &mut self.notices
    }

    /// Fetches the question list once. A failed load is retried on the next
    /// call.
    pub async fn load(
        &mut self,
        api: &dyn QuestionApi,
        token: &SecretString,
        cancel: &CancellationToken,
    ) -> Flow {
        if self.loaded {
            return Flow::Continue;
        }
        match api.list(token, cancel).await {
            Ok(questions) => {
                debug!("Loaded {} questions", questions.len());
                self.questions = questions;
                self.loaded = true;
                Flow::Continue
            }
            Err(e) => self.fail(e, LOAD_FAILED),
        }
    }

    pub async fn submit(
        &mut self,
        api: &dyn QuestionApi,
        token: &SecretString,
        cancel: &CancellationToken,
    ) -> Flow {
        let question = match self.form.validate() {
            Ok(question) => question,
            Err(e) => {
                self.notices.error(e.to_string());
                return Flow::Continue;
            }
        };
        match api.create(token, &question, cancel).await {
            Ok(created) => {
                info!("Question {:?} created", created.id);
                self.questions.push(created);
                self.form.reset();
                self.notices.success(ADDED);
                self.notices.raise_modal();
                Flow::Continue
            }
            Err(e) => self.fail(e, SAVE_FAILED),
        }
    }

    pub async fn delete(
        &mut self,
        api: &dyn QuestionApi,
        token: &SecretString,
        id: &str,
        cancel: &CancellationToken,
    ) -> Flow {
        match api.delete(token, id, cancel).await {
            Ok(()) => {
                info!("Question {id} deleted");
                self.questions.retain(|q| q.id.as_deref() != Some(id));
                self.notices.success(DELETED);
                Flow::Continue
            }
            Err(e) => self.fail(e, DELETE_FAILED),
        }
    }

    fn fail(&mut self, error: ApiError, message: &str) -> Flow {
        match error {
            ApiError::Cancelled => {
                debug!("Ignoring result of cancelled request");
                Flow::Continue
            }
            ApiError::Unauthorized => {
                warn!("Session token rejected by the API");
                Flow::Reauthenticate
            }
            e => {
                warn!("{message}: {e}");
                self.notices.error(message);
                Flow::Continue
            }
        }
    }
}

/// A workspace plus the token that cancels its in-flight requests.
#[derive(Clone)]
pub struct WorkspaceHandle {
    cancel: CancellationToken,
    state: Arc<AsyncMutex<Workspace>>,
}

impl WorkspaceHandle {
    fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            state: Arc::default(),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Operations of one session run one after another.
    pub async fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.state.lock().await
    }
}

/// Workspaces unused for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct Entry {
    handle: WorkspaceHandle,
    last_seen: Instant,
}

impl Entry {
    fn touch(&mut self) -> WorkspaceHandle {
        self.last_seen = Instant::now();
        self.handle.clone()
    }

    fn is_stale(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Open workspaces keyed by session token. Idle ones are swept whenever the
/// registry is consulted.
#[derive(Clone)]
pub struct Workspaces {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
    idle_timeout: Duration,
}

impl Default for Workspaces {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl Workspaces {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            inner: Arc::default(),
            idle_timeout,
        }
    }

    fn registry(&self) -> sync::MutexGuard<'_, HashMap<String, Entry>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = map.len();
        map.retain(|_, entry| {
            let stale = entry.is_stale(self.idle_timeout);
            if stale {
                entry.handle.cancel.cancel();
            }
            !stale
        });
        if map.len() < before {
            debug!("Dropped {} idle workspaces", before - map.len());
        }
        map
    }

    /// Workspace for `token`, created on first use.
    pub fn open(&self, token: &SecretString) -> WorkspaceHandle {
        self.registry()
            .entry(token.expose_secret().to_owned())
            .or_insert_with(|| Entry {
                handle: WorkspaceHandle::new(),
                last_seen: Instant::now(),
            })
            .touch()
    }

    /// Workspace for `token` if one is already open.
    pub fn find(&self, token: &SecretString) -> Option<WorkspaceHandle> {
        self.registry()
            .get_mut(token.expose_secret())
            .map(Entry::touch)
    }

    /// Drops the workspace and cancels whatever it still has in flight.
    pub fn close(&self, token: &SecretString) {
        let removed = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token.expose_secret());
        if let Some(entry) = removed {
            entry.handle.cancel.cancel();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.registry().len()
    }
}
