//! An editing session over one day's entry.
//!
//! Each keystroke re-arms two independent debounce timers: a short one that saves
//! the content and a long one that regenerates the summary. Both timers are children
//! of the session's [`CancellationToken`]; closing or dropping the session cancels
//! anything still pending or in flight.

use anyhow::Result;
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{delete_entry, load_entry, save_content, save_summary};
use crate::ai::helpers::{cancellable, generate_summary};
use crate::ai::Generator;
use crate::config::JournalConfig;
use crate::store::EntryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Loading,
    Saving,
    Saved,
    Error,
}

#[derive(Debug, Clone, Copy)]
pub struct EditorTimings {
    pub save_debounce: Duration,
    pub summary_debounce: Duration,
    /// Auto-summarize only runs for content longer than this many characters.
    pub auto_summary_min_chars: usize,
}

impl From<&JournalConfig> for EditorTimings {
    fn from(config: &JournalConfig) -> Self {
        Self {
            save_debounce: Duration::from_millis(config.save_debounce_ms),
            summary_debounce: Duration::from_millis(config.summary_debounce_ms),
            auto_summary_min_chars: config.auto_summary_min_chars,
        }
    }
}

impl Default for EditorTimings {
    fn default() -> Self {
        Self::from(&JournalConfig::default())
    }
}

/// A pending debounced action. Cancelling it only stops the wait; once the delay has
/// elapsed the work runs under the session token instead.
struct Debounced {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Debounced {
    fn spawn<F>(session: &CancellationToken, delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = session.child_token();
        let timer = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            work.await;
        });
        Self { token, handle }
    }

    fn cancel(self) {
        self.token.cancel();
    }
}

pub struct EditorSession {
    store: EntryStore,
    generator: Arc<dyn Generator>,
    date: NaiveDate,
    timings: EditorTimings,
    content: String,
    session: CancellationToken,
    save_timer: Option<Debounced>,
    summary_timer: Option<Debounced>,
    status: watch::Sender<SaveStatus>,
}

impl EditorSession {
    /// Start editing `date`. A failed load is logged and the session starts empty
    /// with [`SaveStatus::Error`].
    pub fn open(
        store: EntryStore,
        generator: Arc<dyn Generator>,
        date: NaiveDate,
        timings: EditorTimings,
    ) -> Self {
        let (status, _) = watch::channel(SaveStatus::Loading);
        let content = match load_entry(&store, date) {
            Ok(entry) => {
                status.send_replace(SaveStatus::Saved);
                entry.map(|e| e.content).unwrap_or_default()
            }
            Err(e) => {
                tracing::error!(%date, error = %e, "failed to load entry");
                status.send_replace(SaveStatus::Error);
                String::new()
            }
        };

        Self {
            store,
            generator,
            date,
            timings,
            content,
            session: CancellationToken::new(),
            save_timer: None,
            summary_timer: None,
            status,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    /// Watch save status changes.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Token that is cancelled when this session ends.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.session.clone()
    }

    /// Record an edit and re-arm both debounce timers.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.content = text.into();
        self.status.send_replace(SaveStatus::Saving);

        if let Some(timer) = self.save_timer.take() {
            timer.cancel();
        }
        let store = self.store.clone();
        let date = self.date;
        let content = self.content.clone();
        let status = self.status.clone();
        self.save_timer = Some(Debounced::spawn(
            &self.session,
            self.timings.save_debounce,
            async move {
                match save_content(&store, date, &content) {
                    Ok(_) => {
                        status.send_replace(SaveStatus::Saved);
                    }
                    Err(e) => {
                        tracing::error!(%date, error = %e, "autosave failed");
                        status.send_replace(SaveStatus::Error);
                    }
                }
            },
        ));

        if let Some(timer) = self.summary_timer.take() {
            timer.cancel();
        }
        if self.content.chars().count() > self.timings.auto_summary_min_chars {
            let work = self.summary_task(self.content.clone());
            self.summary_timer = Some(Debounced::spawn(
                &self.session,
                self.timings.summary_debounce,
                work,
            ));
        }
    }

    fn summary_task(&self, content: String) -> impl Future<Output = ()> + Send + 'static {
        let store = self.store.clone();
        let generator = Arc::clone(&self.generator);
        let session = self.session.clone();
        let date = self.date;
        async move {
            let summary = cancellable(&session, async {
                Ok(generate_summary(generator.as_ref(), &content).await)
            })
            .await;
            match summary {
                Ok(Some(summary)) => {
                    if let Err(e) = save_summary(&store, date, &summary) {
                        tracing::error!(%date, error = %e, "failed to store summary");
                    } else {
                        tracing::info!(%date, summary = %summary, "summary updated");
                    }
                }
                Ok(None) => {}
                Err(_) => tracing::debug!(%date, "summary cancelled"),
            }
        }
    }

    /// Save the current content immediately (focus lost).
    pub fn flush(&mut self) -> Result<()> {
        if let Some(timer) = self.save_timer.take() {
            timer.cancel();
        }
        let result = save_content(&self.store, self.date, &self.content);
        self.status.send_replace(match result {
            Ok(_) => SaveStatus::Saved,
            Err(_) => SaveStatus::Error,
        });
        result.map(|_| ())
    }

    /// Summarize now, regardless of length gate or timers. Returns the new summary.
    pub async fn summarize_now(&mut self) -> Result<Option<String>> {
        self.flush()?;
        let generated = cancellable(&self.session, async {
            Ok(generate_summary(self.generator.as_ref(), &self.content).await)
        })
        .await
        .unwrap_or(None);

        if let Some(summary) = &generated {
            save_summary(&self.store, self.date, summary)?;
        }
        Ok(generated)
    }

    /// Leave the editor: save, run one last summary for long enough content, then
    /// cancel everything else still pending.
    pub async fn leave(mut self) -> Result<()> {
        self.flush()?;
        if let Some(timer) = self.summary_timer.take() {
            timer.cancel();
        }
        if self.content.chars().count() > self.timings.auto_summary_min_chars {
            self.summary_task(self.content.clone()).await;
        }
        self.close();
        Ok(())
    }

    /// Delete the entry (after the caller confirmed) and end the session.
    pub fn delete(mut self) -> Result<()> {
        self.close();
        delete_entry(&self.store, self.date)
    }

    /// Cancel all pending timers and in-flight AI calls.
    pub fn close(&mut self) {
        self.session.cancel();
        self.save_timer.take();
        self.summary_timer.take();
    }

    /// Wait for any timers that already fired to finish their work.
    #[cfg(test)]
    async fn settle(&mut self) {
        for timer in [self.save_timer.take(), self.summary_timer.take()]
            .into_iter()
            .flatten()
        {
            let _ = timer.handle.await;
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.session.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, GenerateRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for CountingSummarizer {
        async fn generate(&self, _request: &GenerateRequest) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("a morning of small wins".into())
        }
    }

    /// Never answers.
    struct Hanging;

    #[async_trait]
    impl Generator for Hanging {
        async fn generate(&self, _request: &GenerateRequest) -> Result<String, AiError> {
            std::future::pending().await
        }
    }

    fn fast() -> EditorTimings {
        EditorTimings {
            save_debounce: Duration::from_millis(20),
            summary_debounce: Duration::from_millis(80),
            auto_summary_min_chars: 40,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn rapid_edits_collapse_into_one_save_and_one_summary() {
        let store = EntryStore::in_memory().unwrap();
        let generator = Arc::new(CountingSummarizer {
            calls: AtomicUsize::new(0),
        });
        let mut session = EditorSession::open(store.clone(), generator.clone(), day(), fast());

        let long = "today I fixed the bike and rode it to the lake and back";
        for end in [10, 20, 45, long.len()] {
            session.edit(&long[..end]);
        }
        assert_eq!(session.status(), SaveStatus::Saving);

        tokio::time::sleep(Duration::from_millis(200)).await;
        session.settle().await;

        let entry = load_entry(&store, day()).unwrap().unwrap();
        assert_eq!(entry.content, long);
        assert_eq!(entry.summary.as_deref(), Some("a morning of small wins"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.status(), SaveStatus::Saved);
    }

    #[tokio::test]
    async fn short_content_is_never_auto_summarized() {
        let store = EntryStore::in_memory().unwrap();
        let generator = Arc::new(CountingSummarizer {
            calls: AtomicUsize::new(0),
        });
        let mut session = EditorSession::open(store.clone(), generator.clone(), day(), fast());

        session.edit("just a short note today");
        tokio::time::sleep(Duration::from_millis(200)).await;
        session.settle().await;

        let entry = load_entry(&store, day()).unwrap().unwrap();
        assert_eq!(entry.summary, None);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn close_cancels_pending_timers() {
        let store = EntryStore::in_memory().unwrap();
        let generator = Arc::new(CountingSummarizer {
            calls: AtomicUsize::new(0),
        });
        let mut session = EditorSession::open(store.clone(), generator.clone(), day(), fast());

        session.edit("this edit should never reach the database at all, ever");
        session.close();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.keys().unwrap().is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropping_session_cancels_hung_summary() {
        let store = EntryStore::in_memory().unwrap();
        let session_token;
        {
            let mut session = EditorSession::open(store.clone(), Arc::new(Hanging), day(), fast());
            session_token = session.cancellation_token();
            session.edit("a long enough entry to trigger the summarizer task");
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        assert!(session_token.is_cancelled());

        // Content was saved before the drop; the hung summary never lands.
        let entry = load_entry(&store, day()).unwrap().unwrap();
        assert_eq!(entry.summary, None);
    }

    #[tokio::test]
    async fn leave_saves_and_summarizes() {
        let store = EntryStore::in_memory().unwrap();
        let generator = Arc::new(CountingSummarizer {
            calls: AtomicUsize::new(0),
        });
        let mut session = EditorSession::open(store.clone(), generator, day(), EditorTimings::default());
        session.edit("written right before hitting back, long enough to summarize");
        session.leave().await.unwrap();

        let entry = load_entry(&store, day()).unwrap().unwrap();
        assert!(entry.content.starts_with("written right before"));
        assert!(entry.summary.is_some());
    }

    #[tokio::test]
    async fn reopening_loads_existing_content() {
        let store = EntryStore::in_memory().unwrap();
        store
            .set("journal-2024-03-01", &serde_json::json!("legacy words"))
            .unwrap();
        let session = EditorSession::open(store, Arc::new(Hanging), day(), fast());
        assert_eq!(session.content(), "legacy words");
        assert_eq!(session.status(), SaveStatus::Saved);
    }
}
