//! The session registry: thread-safe supervision of per-keyword sessions.
//!
//! Dependencies (adapter factory, store, notifier) are injected, never
//! process-wide singletons, so multiple independent monitor instances
//! can coexist in one process. The registry mutex guards only map
//! bookkeeping - it is never held across a fetch, a store call, or a
//! sleep, so adding or stopping keywords never stalls on in-flight
//! polls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::session::PollSession;
use crate::traits::notifier::Notifier;
use crate::traits::source::SourceAdapterFactory;
use crate::traits::store::SnapshotStore;
use crate::types::{SessionConfig, DEFAULT_STOP_TIMEOUT};

/// Where a registered keyword currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Registered, never started
    Idle,
    /// Session task is live
    Running,
    /// Session was cancelled (or finished); still registered and
    /// restartable by the next `start_all`
    Stopped,
}

struct RunningSession {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Entry {
    running: Option<RunningSession>,
    ever_started: bool,
}

/// Keyword → session table with start/stop/shutdown supervision.
pub struct SessionRegistry {
    adapters: Arc<dyn SourceAdapterFactory>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    stop_timeout: Duration,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionRegistry {
    /// Create a registry over the given collaborators.
    pub fn new(
        adapters: Arc<dyn SourceAdapterFactory>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            adapters,
            store,
            notifier,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Bound how long `stop_all` waits for each session to stop.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Register a keyword in the Idle state.
    ///
    /// Never starts work. Returns `false` (a no-op) if the keyword is
    /// already registered, running or not.
    pub fn register(&self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&keyword) {
            return false;
        }
        info!(keyword = %keyword, "keyword registered");
        sessions.insert(keyword, Entry::default());
        true
    }

    /// Start a session for every registered keyword that has none
    /// running. Idempotent: already-running keywords are untouched.
    ///
    /// Returns the number of sessions started. Must be called from
    /// within a tokio runtime.
    pub fn start_all(&self, config: SessionConfig) -> usize {
        let mut sessions = self.sessions.lock().unwrap();
        let mut started = 0;

        for (keyword, entry) in sessions.iter_mut() {
            if let Some(running) = &entry.running {
                if !running.handle.is_finished() {
                    continue;
                }
            }

            let token = CancellationToken::new();
            let session = PollSession::new(
                keyword.clone(),
                self.adapters.create(keyword),
                Arc::clone(&self.store),
                Arc::clone(&self.notifier),
                config,
            );
            let handle = tokio::spawn(session.run(token.clone()));
            entry.running = Some(RunningSession { token, handle });
            entry.ever_started = true;
            started += 1;
        }

        if started > 0 {
            info!(started, "sessions started");
        }
        started
    }

    /// Signal cancellation to every running session and wait, bounded
    /// by the stop timeout, for each to stop.
    ///
    /// Sessions that miss the deadline are logged and abandoned;
    /// running bookkeeping is cleared either way so a subsequent
    /// `start_all` creates fresh sessions.
    pub async fn stop_all(&self) {
        let targets: Vec<(String, RunningSession)> = {
            let mut sessions = self.sessions.lock().unwrap();
            sessions
                .iter_mut()
                .filter_map(|(keyword, entry)| {
                    entry.running.take().map(|r| (keyword.clone(), r))
                })
                .collect()
        };

        if targets.is_empty() {
            return;
        }

        info!(count = targets.len(), "stopping sessions");
        for (_, running) in &targets {
            running.token.cancel();
        }

        let timeout = self.stop_timeout;
        let waits = targets.into_iter().map(|(keyword, running)| async move {
            match tokio::time::timeout(timeout, running.handle).await {
                Ok(Ok(())) => debug!(keyword = %keyword, "session stopped"),
                Ok(Err(e)) => error!(keyword = %keyword, error = %e, "session task failed"),
                Err(_) => {
                    warn!(keyword = %keyword, "session did not stop within timeout, abandoning")
                }
            }
        });
        futures::future::join_all(waits).await;
    }

    /// Stop one keyword's session, if it is running.
    ///
    /// Returns `true` if a session was signalled. The keyword stays
    /// registered and restartable.
    pub async fn stop_one(&self, keyword: &str) -> bool {
        let running = {
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.get_mut(keyword) {
                Some(entry) => entry.running.take(),
                None => None,
            }
        };

        let Some(running) = running else {
            return false;
        };

        running.token.cancel();
        match tokio::time::timeout(self.stop_timeout, running.handle).await {
            Ok(Ok(())) => debug!(keyword = %keyword, "session stopped"),
            Ok(Err(e)) => error!(keyword = %keyword, error = %e, "session task failed"),
            Err(_) => warn!(keyword = %keyword, "session did not stop within timeout, abandoning"),
        }
        true
    }

    /// Remove a keyword from the registry, stopping its session first.
    ///
    /// This is the only way a registered keyword is destroyed;
    /// cancellation alone leaves it Stopped but registered.
    pub async fn remove(&self, keyword: &str) -> bool {
        self.stop_one(keyword).await;
        let removed = self.sessions.lock().unwrap().remove(keyword).is_some();
        if removed {
            info!(keyword = %keyword, "keyword removed");
        }
        removed
    }

    /// Stop everything; safe to call from a process-termination path
    /// even if no session was ever started.
    pub async fn shutdown(&self) {
        debug!("registry shutting down");
        self.stop_all().await;
    }

    /// All registered keywords, sorted.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = self.sessions.lock().unwrap().keys().cloned().collect();
        keywords.sort();
        keywords
    }

    /// Lifecycle status of one keyword, `None` if unregistered.
    pub fn status(&self, keyword: &str) -> Option<SessionStatus> {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(keyword).map(|entry| match &entry.running {
            Some(running) if !running.handle.is_finished() => SessionStatus::Running,
            Some(_) => SessionStatus::Stopped,
            None if entry.ever_started => SessionStatus::Stopped,
            None => SessionStatus::Idle,
        })
    }

    /// Number of sessions currently running.
    pub fn running_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .filter(|entry| {
                entry
                    .running
                    .as_ref()
                    .is_some_and(|r| !r.handle.is_finished())
            })
            .count()
    }
}
