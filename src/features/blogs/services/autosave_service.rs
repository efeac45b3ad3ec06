//! Debounced draft autosave.
//!
//! One session per blog being edited. Every edit restarts a trailing-edge
//! timer; when it fires the draft is saved unless a save is already in
//! flight, in which case the draft simply stays dirty. `flush` drains the
//! session before the client navigates away. A session left clean and idle
//! for `IDLE_TIMEOUT` is closed so abandoned editors do not pile up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::blogs::dtos::DraftStatusDto;
use crate::features::blogs::models::{BlogDraft, DraftFields, DraftPatch};

const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

type SessionMap = Mutex<HashMap<Uuid, Arc<Session>>>;

/// Persistence of draft fields for blogs owned by `user_id`
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Current fields of an editable blog owned by `user_id`
    async fn load_draft(&self, user_id: &str, blog_id: Uuid) -> Result<DraftFields>;

    async fn save_draft(&self, user_id: &str, blog_id: Uuid, fields: &DraftFields) -> Result<()>;
}

struct SessionState {
    draft: BlogDraft,
    /// Bumped by every edit and flush; a timer only fires for its own generation
    generation: u64,
    saving: bool,
    /// Removed from the map; edits must open a fresh session
    closed: bool,
    last_saved_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

struct Session {
    blog_id: Uuid,
    owner: String,
    state: Mutex<SessionState>,
    save_finished: Notify,
}

impl Session {
    fn new(blog_id: Uuid, owner: String, fields: DraftFields) -> Self {
        Self {
            blog_id,
            owner,
            state: Mutex::new(SessionState {
                draft: BlogDraft::from_server(fields),
                generation: 0,
                saving: false,
                closed: false,
                last_saved_at: None,
                last_error: None,
            }),
            save_finished: Notify::new(),
        }
    }

    async fn status(&self) -> DraftStatusDto {
        let state = self.state.lock().await;
        DraftStatusDto {
            blog_id: self.blog_id,
            dirty: state.draft.is_dirty(),
            saving: state.saving,
            last_saved_at: state.last_saved_at,
            last_error: state.last_error.clone(),
        }
    }

    /// Timer callback. Returns whether `generation` is still the latest edit.
    async fn save_if_current(&self, store: &dyn DraftStore, generation: u64) -> bool {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                return false;
            }
            if !state.draft.is_dirty() {
                return true;
            }
            if state.saving {
                tracing::debug!("Save of blog {} in flight, skipping", self.blog_id);
                return true;
            }
            state.saving = true;
            state.draft.fields().clone()
        };

        // Failures are recorded on the session; the next cycle retries
        let _ = self.persist(store, snapshot).await;
        true
    }

    /// Save `snapshot`; caller has set `saving`
    async fn persist(&self, store: &dyn DraftStore, snapshot: DraftFields) -> Result<()> {
        let result = store.save_draft(&self.owner, self.blog_id, &snapshot).await;

        {
            let mut state = self.state.lock().await;
            state.saving = false;
            match &result {
                Ok(()) => {
                    state.draft.mark_saved(snapshot);
                    state.last_saved_at = Some(Utc::now());
                    state.last_error = None;
                }
                Err(e) => {
                    tracing::warn!("Autosave of blog {} failed: {}", self.blog_id, e);
                    state.last_error = Some(e.to_string());
                }
            }
        }

        self.save_finished.notify_waiters();
        result
    }
}

/// Close `session` if nothing was edited since `generation` and it holds no
/// unsaved edits. Map lock is taken before the session lock.
async fn close_if_idle(sessions: &SessionMap, session: &Arc<Session>, generation: u64) {
    let mut sessions = sessions.lock().await;
    let is_current = sessions
        .get(&session.blog_id)
        .is_some_and(|current| Arc::ptr_eq(current, session));
    if !is_current {
        return;
    }

    let mut state = session.state.lock().await;
    if state.generation != generation || state.saving || state.draft.is_dirty() {
        return;
    }
    state.closed = true;
    drop(state);

    sessions.remove(&session.blog_id);
    tracing::debug!("Closed idle autosave session of blog {}", session.blog_id);
}

pub struct AutosaveService {
    store: Arc<dyn DraftStore>,
    debounce: Duration,
    idle_timeout: Duration,
    sessions: Arc<SessionMap>,
}

impl AutosaveService {
    pub fn new(store: Arc<dyn DraftStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            idle_timeout: IDLE_TIMEOUT,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn existing(&self, user_id: &str, blog_id: Uuid) -> Result<Option<Arc<Session>>> {
        let session = self.sessions.lock().await.get(&blog_id).cloned();
        match session {
            Some(s) if s.owner != user_id => Err(AppError::Forbidden(
                "This blog is being edited by its author".to_string(),
            )),
            other => Ok(other),
        }
    }

    async fn session_for(&self, user_id: &str, blog_id: Uuid) -> Result<Arc<Session>> {
        if let Some(session) = self.existing(user_id, blog_id).await? {
            return Ok(session);
        }

        // Load outside the map lock; the first inserted session wins
        let fields = self.store.load_draft(user_id, blog_id).await?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(blog_id)
            .or_insert_with(|| Arc::new(Session::new(blog_id, user_id.to_string(), fields)))
            .clone();

        if session.owner != user_id {
            return Err(AppError::Forbidden(
                "This blog is being edited by its author".to_string(),
            ));
        }
        Ok(session)
    }

    /// Apply an edit and (re)arm the debounce timer
    pub async fn record_edit(
        &self,
        user_id: &str,
        blog_id: Uuid,
        patch: DraftPatch,
    ) -> Result<DraftStatusDto> {
        let (session, generation) = loop {
            let session = self.session_for(user_id, blog_id).await?;
            let mut state = session.state.lock().await;
            if state.closed {
                // Lost the race with an idle close; the next lookup opens a new session
                continue;
            }
            state.draft.apply(patch);
            state.generation += 1;
            let generation = state.generation;
            drop(state);
            break (session, generation);
        };

        tracing::debug!(
            "Autosave of blog {} scheduled in {:?} (generation {})",
            blog_id,
            self.debounce,
            generation
        );

        let store = self.store.clone();
        let sessions = self.sessions.clone();
        let timer_session = session.clone();
        let (delay, idle_timeout) = (self.debounce, self.idle_timeout);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !timer_session
                .save_if_current(store.as_ref(), generation)
                .await
            {
                return;
            }
            tokio::time::sleep(idle_timeout).await;
            close_if_idle(&sessions, &timer_session, generation).await;
        });

        Ok(session.status().await)
    }

    /// Wait for any in-flight save, save remaining edits and close the
    /// session. On failure the session stays open with its edits.
    pub async fn flush(&self, user_id: &str, blog_id: Uuid) -> Result<Option<DraftStatusDto>> {
        let Some(session) = self.existing(user_id, blog_id).await? else {
            return Ok(None);
        };

        loop {
            let mut state = session.state.lock().await;
            if state.saving {
                let finished = session.save_finished.notified();
                drop(state);
                finished.await;
                continue;
            }

            // Cancels pending timers
            state.generation += 1;
            if !state.draft.is_dirty() {
                break;
            }

            state.saving = true;
            let snapshot = state.draft.fields().clone();
            drop(state);
            session.persist(self.store.as_ref(), snapshot).await?;
        }

        let status = session.status().await;

        let mut sessions = self.sessions.lock().await;
        if sessions
            .get(&blog_id)
            .is_some_and(|current| Arc::ptr_eq(current, &session))
        {
            // An edit that arrived after the drain keeps the session open
            let mut state = session.state.lock().await;
            if !state.draft.is_dirty() {
                state.closed = true;
                drop(state);
                sessions.remove(&blog_id);
            }
        }

        tracing::debug!("Flushed autosave session of blog {}", blog_id);
        Ok(Some(status))
    }

    /// Drop a session without saving (blog deleted)
    pub async fn discard(&self, blog_id: Uuid) {
        let removed = self.sessions.lock().await.remove(&blog_id);
        if let Some(session) = removed {
            let mut state = session.state.lock().await;
            state.generation += 1;
            state.closed = true;
        }
    }

    pub async fn status(&self, user_id: &str, blog_id: Uuid) -> Result<Option<DraftStatusDto>> {
        match self.existing(user_id, blog_id).await? {
            Some(session) => Ok(Some(session.status().await)),
            None => Ok(None),
        }
    }

    /// Merge freshly loaded server fields into an open session and return
    /// the fields the editor should show; `None` without a session.
    pub async fn reconcile(&self, blog_id: Uuid, incoming: &DraftFields) -> Option<DraftFields> {
        let session = self.sessions.lock().await.get(&blog_id).cloned()?;
        let mut state = session.state.lock().await;
        if state.draft.reconcile(incoming) {
            tracing::debug!("Reconciled blog {} with server changes", blog_id);
        }
        Some(state.draft.fields().clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    const DEBOUNCE: Duration = Duration::from_millis(1500);

    /// In-memory store with an optional save latency
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub saves: StdMutex<Vec<DraftFields>>,
        pub latency: Duration,
        pub fail: AtomicBool,
        in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl DraftStore for MemoryStore {
        async fn load_draft(&self, _user_id: &str, _blog_id: Uuid) -> Result<DraftFields> {
            Ok(DraftFields::default())
        }

        async fn save_draft(&self, _user_id: &str, _blog_id: Uuid, fields: &DraftFields) -> Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Internal("database unavailable".to_string()));
            }
            self.saves.lock().unwrap().push(fields.clone());
            Ok(())
        }
    }

    fn title(t: &str) -> DraftPatch {
        DraftPatch {
            title: Some(t.to_string()),
            ..Default::default()
        }
    }

    fn service(store: Arc<MemoryStore>) -> AutosaveService {
        AutosaveService::new(store, DEBOUNCE)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_produce_one_save() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        for i in 0..5 {
            autosave
                .record_edit("writer", blog, title(&format!("Draft {}", i)))
                .await
                .unwrap();
            tokio::time::advance(Duration::from_millis(300)).await;
        }

        tokio::time::sleep(Duration::from_secs(3)).await;

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].title, "Draft 4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_save_separately() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("One")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        autosave.record_edit("writer", blog, title("Two")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(store.saves.lock().unwrap().len(), 2);
        let status = autosave.status("writer", blog).await.unwrap().unwrap();
        assert!(!status.dirty);
        assert!(status.last_saved_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_skipped_while_in_flight() {
        let store = Arc::new(MemoryStore {
            latency: Duration::from_secs(3),
            ..Default::default()
        });
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        // First save starts at 1.5s and completes at 4.5s
        autosave.record_edit("writer", blog, title("One")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Timer fires at 3.5s while the first save is still running
        autosave.record_edit("writer", blog, title("Two")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(store.saves.lock().unwrap().len(), 1);
        assert_eq!(store.saves.lock().unwrap()[0].title, "One");

        let status = autosave.status("writer", blog).await.unwrap().unwrap();
        assert!(status.dirty);

        autosave.flush("writer", blog).await.unwrap();
        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[1].title, "Two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_persists_edit_inside_window() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("Last words")).await.unwrap();
        let status = autosave.flush("writer", blog).await.unwrap().unwrap();
        assert!(!status.dirty);

        // The pending timer must not save again
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.saves.lock().unwrap().len(), 1);
        assert!(autosave.status("writer", blog).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_waits_for_in_flight_save() {
        let store = Arc::new(MemoryStore {
            latency: Duration::from_secs(2),
            ..Default::default()
        });
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("One")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1600)).await;

        let status = autosave.flush("writer", blog).await.unwrap().unwrap();
        assert!(!status.saving);
        assert!(!status.dirty);
        assert_eq!(store.saves.lock().unwrap().len(), 1);
        assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_swallowed_and_retried_by_flush() {
        let store = Arc::new(MemoryStore::default());
        store.fail.store(true, Ordering::SeqCst);
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("One")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let status = autosave.status("writer", blog).await.unwrap().unwrap();
        assert!(status.dirty);
        assert!(status.last_error.is_some());

        // Failed flush keeps the session and its edits
        assert!(autosave.flush("writer", blog).await.is_err());
        assert!(autosave.status("writer", blog).await.unwrap().is_some());

        store.fail.store(false, Ordering::SeqCst);
        autosave.flush("writer", blog).await.unwrap();
        assert_eq!(store.saves.lock().unwrap()[0].title, "One");
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_sessions_close_after_idle_timeout() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store.clone());
        let blogs: Vec<Uuid> = (0..50).map(|_| Uuid::new_v4()).collect();

        for blog in &blogs {
            autosave.record_edit("writer", *blog, title("Left open")).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.saves.lock().unwrap().len(), blogs.len());
        assert_eq!(autosave.sessions.lock().await.len(), blogs.len());

        tokio::time::sleep(IDLE_TIMEOUT).await;
        assert!(autosave.sessions.lock().await.is_empty());
        assert!(autosave.status("writer", blogs[0]).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_or_dirty_sessions_stay_open() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store.clone());
        let active = Uuid::new_v4();
        let failing = Uuid::new_v4();

        autosave.record_edit("writer", active, title("One")).await.unwrap();
        tokio::time::sleep(IDLE_TIMEOUT / 2).await;
        autosave.record_edit("writer", active, title("Two")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        store.fail.store(true, Ordering::SeqCst);
        autosave.record_edit("writer", failing, title("Unsaved")).await.unwrap();

        // First edit's idle window has passed; the second one's has not
        tokio::time::sleep(IDLE_TIMEOUT / 2 + Duration::from_secs(5)).await;
        assert!(autosave.status("writer", active).await.unwrap().is_some());

        tokio::time::sleep(IDLE_TIMEOUT).await;
        assert!(autosave.status("writer", active).await.unwrap().is_none());

        let status = autosave.status("writer", failing).await.unwrap().unwrap();
        assert!(status.dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_after_idle_close_opens_new_session() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store.clone());
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("Before")).await.unwrap();
        tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(2)).await;
        assert!(autosave.status("writer", blog).await.unwrap().is_none());

        let status = autosave.record_edit("writer", blog, title("After")).await.unwrap();
        assert!(status.dirty);
        autosave.flush("writer", blog).await.unwrap();

        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[1].title, "After");
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_belongs_to_its_author() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store);
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("Mine")).await.unwrap();
        let err = autosave
            .record_edit("intruder", blog, title("Theirs"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_merges_into_open_session() {
        let store = Arc::new(MemoryStore::default());
        let autosave = service(store);
        let blog = Uuid::new_v4();

        autosave.record_edit("writer", blog, title("Local")).await.unwrap();

        let server = DraftFields {
            title: "Remote".to_string(),
            title_tamil: "தொலை".to_string(),
            ..Default::default()
        };
        let merged = autosave.reconcile(blog, &server).await.unwrap();
        assert_eq!(merged.title, "Local");
        assert_eq!(merged.title_tamil, "தொலை");

        assert!(autosave.reconcile(Uuid::new_v4(), &server).await.is_none());
    }
}
