//! Timer engine: owner of the active timer collection

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::{Category, CompletionEvent, HistoryEntry, TickOutcome, Timer};
use crate::{
    error::ValidationError,
    services::HistoryRecorder,
    storage::TimerRepository,
    tasks::{persistence_task, spawn_tick_scheduler, PersistJob, TickerHandle},
};

/// Result of toggling an existing timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started(Timer),
    Paused(Timer),
    /// The timer has no time left and must be reset before starting again
    RequiresReset(Timer),
}

/// Authoritative in-memory set of timers.
///
/// Every operation runs to completion under one lock, so `create`, `toggle`,
/// `reset` and `tick` never interleave. Observers see the new collection
/// before it reaches the store: each mutation publishes a snapshot and then
/// queues that same snapshot for the persistence task.
pub struct TimerEngine {
    timers: Mutex<Vec<Timer>>,
    /// Latest published collection
    snapshot_tx: watch::Sender<Vec<Timer>>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<Vec<Timer>>,
    completion_tx: broadcast::Sender<CompletionEvent>,
    persist_tx: mpsc::UnboundedSender<PersistJob>,
    repository: TimerRepository,
    ticker: tokio::sync::Mutex<Option<TickerHandle>>,
}

impl TimerEngine {
    /// Load the persisted collection and start the persistence task
    pub async fn load(repository: TimerRepository) -> Arc<Self> {
        let timers = repository.load_timers().await;
        info!("Timer engine loaded with {} timers", timers.len());
        Self::with_timers(repository, timers)
    }

    /// Build an engine around an existing collection
    pub fn with_timers(repository: TimerRepository, timers: Vec<Timer>) -> Arc<Self> {
        let (snapshot_tx, snapshot_rx) = watch::channel(timers.clone());
        let (completion_tx, _) = broadcast::channel(100);
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();

        let recorder = HistoryRecorder::new(repository.clone());
        tokio::spawn(persistence_task(persist_rx, repository.clone(), recorder));

        Arc::new(Self {
            timers: Mutex::new(timers),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
            completion_tx,
            persist_tx,
            repository,
            ticker: tokio::sync::Mutex::new(None),
        })
    }

    /// Create an idle timer and append it to the collection.
    /// Invalid input leaves the collection untouched.
    pub fn create(
        &self,
        name: &str,
        duration_seconds: u64,
        category: Category,
    ) -> Result<Timer, ValidationError> {
        let timer = Timer::new(name, duration_seconds, category)?;

        let mut timers = self.lock_timers();
        timers.push(timer.clone());
        self.commit(&timers);
        drop(timers);

        info!(
            "Created timer '{}' ({}s, {}) with id {}",
            timer.name, timer.duration_seconds, timer.category, timer.id
        );
        Ok(timer)
    }

    /// Create a timer from raw form input
    pub fn create_from_input(
        &self,
        name: &str,
        duration: &str,
        category: &str,
    ) -> Result<Timer, ValidationError> {
        let duration_seconds = super::timer::parse_duration(duration)?;
        let category = category.parse()?;
        self.create(name, duration_seconds, category)
    }

    /// Start or pause a timer. Unknown ids are a no-op and yield `None`.
    pub fn toggle(&self, id: &str) -> Option<ToggleOutcome> {
        let mut timers = self.lock_timers();
        let Some(timer) = timers.iter_mut().find(|t| t.id == id) else {
            debug!("Toggle ignored, no timer with id {}", id);
            return None;
        };

        if !timer.toggle() {
            debug!("Timer {} has no time left, reset required before starting", id);
            return Some(ToggleOutcome::RequiresReset(timer.clone()));
        }

        let timer = timer.clone();
        self.commit(&timers);
        drop(timers);

        if timer.is_running {
            info!("Started timer '{}' with {}s remaining", timer.name, timer.remaining_seconds);
            Some(ToggleOutcome::Started(timer))
        } else {
            info!("Paused timer '{}' with {}s remaining", timer.name, timer.remaining_seconds);
            Some(ToggleOutcome::Paused(timer))
        }
    }

    /// Restore a timer's full duration and stop it. Unknown ids yield `None`.
    pub fn reset(&self, id: &str) -> Option<Timer> {
        let mut timers = self.lock_timers();
        let Some(timer) = timers.iter_mut().find(|t| t.id == id) else {
            debug!("Reset ignored, no timer with id {}", id);
            return None;
        };

        timer.reset();
        let timer = timer.clone();
        self.commit(&timers);
        drop(timers);

        info!("Reset timer '{}' to {}s", timer.name, timer.duration_seconds);
        Some(timer)
    }

    /// Advance every running timer by one second as a single batch.
    ///
    /// Returns the completions produced by this tick; each one is also
    /// broadcast and queued for recording exactly once.
    pub fn tick(&self) -> Vec<CompletionEvent> {
        let mut timers = self.lock_timers();
        let now = Utc::now();
        let mut changed = false;
        let mut completions = Vec::new();

        for timer in timers.iter_mut() {
            match timer.advance() {
                TickOutcome::Unchanged => {}
                TickOutcome::Decremented => changed = true,
                TickOutcome::Completed => {
                    changed = true;
                    completions.push(CompletionEvent {
                        timer: timer.clone(),
                        completed_at: now,
                    });
                }
            }
        }

        if !changed {
            return completions;
        }

        self.commit(&timers);
        for event in &completions {
            info!("Timer '{}' ({}) completed", event.timer.name, event.timer.category);
            self.queue(PersistJob::Record(event.clone()));
            if self.completion_tx.send(event.clone()).is_err() {
                debug!("No completion subscribers for timer {}", event.timer.id);
            }
        }
        drop(timers);

        completions
    }

    /// Current collection
    pub fn snapshot(&self) -> Vec<Timer> {
        self.lock_timers().clone()
    }

    pub fn get(&self, id: &str) -> Option<Timer> {
        self.lock_timers().iter().find(|t| t.id == id).cloned()
    }

    /// Watch the collection; every committed change is published
    pub fn subscribe(&self) -> watch::Receiver<Vec<Timer>> {
        self.snapshot_tx.subscribe()
    }

    /// Receive one event per completion transition
    pub fn subscribe_completions(&self) -> broadcast::Receiver<CompletionEvent> {
        self.completion_tx.subscribe()
    }

    /// History log, including every completion queued before this call
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.flush().await;
        self.repository.load_history().await
    }

    pub fn repository(&self) -> &TimerRepository {
        &self.repository
    }

    /// Wait until every write queued before this call has been applied
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.queue(PersistJob::Flush(ack_tx));
        if ack_rx.await.is_err() {
            warn!("Persistence task unavailable, flush skipped");
        }
    }

    /// Start ticking every `period`. Returns false if a scheduler is
    /// already running.
    pub async fn start_ticker(self: &Arc<Self>, period: Duration) -> bool {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            warn!("Tick scheduler already running");
            return false;
        }
        *ticker = Some(spawn_tick_scheduler(Arc::clone(self), period));
        true
    }

    /// Stop the tick scheduler and drain pending writes
    pub async fn shutdown(&self) {
        let handle = self.ticker.lock().await.take();
        if let Some(handle) = handle {
            handle.cancel().await;
        }
        self.flush().await;
        info!("Timer engine shut down");
    }

    fn lock_timers(&self) -> MutexGuard<'_, Vec<Timer>> {
        // Mutations never panic midway, so a poisoned collection is still consistent
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish the collection to observers and queue it for saving.
    /// Called with the collection lock held so saves keep mutation order.
    fn commit(&self, timers: &[Timer]) {
        let snapshot = timers.to_vec();
        if let Err(e) = self.snapshot_tx.send(snapshot.clone()) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
        self.queue(PersistJob::SaveTimers(snapshot));
    }

    fn queue(&self, job: PersistJob) {
        if self.persist_tx.send(job).is_err() {
            warn!("Persistence task stopped, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    async fn engine() -> Arc<TimerEngine> {
        TimerEngine::load(TimerRepository::new(Arc::new(MemoryStore::new()))).await
    }

    #[tokio::test]
    async fn test_create_appends_idle_timer() {
        let engine = engine().await;
        let timer = engine.create("Focus", 5, Category::Study).unwrap();

        assert_eq!(engine.snapshot(), vec![timer.clone()]);
        assert_eq!(timer.remaining_seconds, 5);
        assert!(!timer.is_running);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let engine = engine().await;
        let mut rx = engine.subscribe();
        rx.borrow_and_update();

        assert_eq!(engine.create("", 5, Category::Study), Err(ValidationError::EmptyName));
        assert!(engine.create_from_input("Run", "abc", "Workout").is_err());
        assert!(engine.create_from_input("Run", "-3", "Workout").is_err());
        assert!(engine.create_from_input("Run", "3", "Nap").is_err());

        assert!(engine.snapshot().is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_id_is_noop() {
        let engine = engine().await;
        let timer = engine.create("Focus", 5, Category::Study).unwrap();

        assert_eq!(engine.toggle("missing"), None);
        assert_eq!(engine.reset("missing"), None);
        assert_eq!(engine.snapshot(), vec![timer]);
    }

    #[tokio::test]
    async fn test_toggle_start_and_pause() {
        let engine = engine().await;
        let id = engine.create("Focus", 5, Category::Study).unwrap().id;

        assert!(matches!(engine.toggle(&id), Some(ToggleOutcome::Started(t)) if t.is_running));
        engine.tick();
        assert!(matches!(
            engine.toggle(&id),
            Some(ToggleOutcome::Paused(t)) if t.remaining_seconds == 4
        ));
    }

    #[tokio::test]
    async fn test_completed_timer_requires_reset() {
        let engine = engine().await;
        let id = engine.create("Quick", 1, Category::Break).unwrap().id;
        engine.toggle(&id);
        assert_eq!(engine.tick().len(), 1);

        assert!(matches!(engine.toggle(&id), Some(ToggleOutcome::RequiresReset(_))));
        assert!(!engine.get(&id).unwrap().is_running);

        engine.reset(&id);
        assert!(matches!(engine.toggle(&id), Some(ToggleOutcome::Started(_))));
    }

    #[tokio::test]
    async fn test_tick_publishes_one_snapshot_per_batch() {
        let engine = engine().await;
        let a = engine.create("a", 3, Category::Study).unwrap().id;
        let b = engine.create("b", 4, Category::Workout).unwrap().id;
        engine.toggle(&a);
        engine.toggle(&b);

        let mut rx = engine.subscribe();
        rx.borrow_and_update();
        engine.tick();

        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone();
        assert_eq!(published[0].remaining_seconds, 2);
        assert_eq!(published[1].remaining_seconds, 3);
    }

    #[tokio::test]
    async fn test_idle_tick_publishes_nothing() {
        let engine = engine().await;
        engine.create("idle", 3, Category::Study).unwrap();

        let mut rx = engine.subscribe();
        rx.borrow_and_update();
        assert!(engine.tick().is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_completion_is_broadcast_once() {
        let engine = engine().await;
        let mut completions = engine.subscribe_completions();
        let id = engine.create("Focus", 2, Category::Study).unwrap().id;
        engine.toggle(&id);

        for _ in 0..5 {
            engine.tick();
        }

        let event = completions.try_recv().unwrap();
        assert_eq!(event.timer.id, id);
        assert_eq!(event.timer.remaining_seconds, 0);
        assert!(completions.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_mutations_are_saved() {
        let engine = engine().await;
        let id = engine.create("Focus", 5, Category::Study).unwrap().id;
        engine.toggle(&id);
        engine.tick();
        engine.flush().await;

        let stored = engine.repository().load_timers().await;
        assert_eq!(stored, engine.snapshot());
        assert_eq!(stored[0].remaining_seconds, 4);
    }
}
