//! Translation between the in-memory collections and the durable store

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::PersistentStore;
use crate::{
    error::{RepositoryError, StoreError},
    state::{HistoryEntry, Timer},
};

/// Store key holding the active timer collection
pub const TIMERS_KEY: &str = "timers";
/// Store key holding the history log
pub const HISTORY_KEY: &str = "timerHistory";

/// Reads and writes timers and history as JSON arrays
#[derive(Clone)]
pub struct TimerRepository {
    store: Arc<dyn PersistentStore>,
}

impl TimerRepository {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Load the active collection. Absent or unreadable data yields an
    /// empty collection; records that fail to decode are skipped and the
    /// rest are repaired to satisfy the timer invariants.
    pub async fn load_timers(&self) -> Vec<Timer> {
        let timers: Vec<Timer> = self.load_sequence(TIMERS_KEY).await;
        let total = timers.len();
        let timers: Vec<Timer> = timers.into_iter().filter_map(Timer::normalized).collect();

        if timers.len() != total {
            warn!("Dropped {} invalid timer records from storage", total - timers.len());
        }
        debug!("Loaded {} timers", timers.len());
        timers
    }

    pub async fn save_timers(&self, timers: &[Timer]) -> Result<(), RepositoryError> {
        self.save_sequence(TIMERS_KEY, timers).await
    }

    /// Load the history log for display. Unreadable data yields an empty
    /// log and undecodable records are skipped.
    pub async fn load_history(&self) -> Vec<HistoryEntry> {
        self.load_sequence(HISTORY_KEY).await
    }

    /// Read the log, append one entry and write it back.
    ///
    /// The stored log is only rewritten when it was read and decoded in
    /// full; otherwise the error is returned and nothing is written.
    /// Callers must not append concurrently.
    pub async fn append_history(&self, entry: HistoryEntry) -> Result<(), RepositoryError> {
        let mut history: Vec<HistoryEntry> = match self.store.get(HISTORY_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| RepositoryError::Decode {
                key: HISTORY_KEY,
                source,
            })?,
            None => Vec::new(),
        };

        history.push(entry);
        self.save_sequence(HISTORY_KEY, &history).await
    }

    /// The raw history value exactly as stored
    pub async fn history_blob(&self) -> Result<Option<String>, StoreError> {
        self.store.get(HISTORY_KEY).await
    }

    async fn load_sequence<T: DeserializeOwned>(&self, key: &'static str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read {} from store, using empty collection: {}", key, e);
                return Vec::new();
            }
        };

        let records: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Malformed {} data in store, using empty collection: {}", key, e);
                return Vec::new();
            }
        };

        let total = records.len();
        let items: Vec<T> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!("Skipping undecodable {} record: {}", key, e);
                    None
                }
            })
            .collect();

        if items.len() != total {
            warn!("Skipped {} undecodable {} records", total - items.len(), key);
        }
        items
    }

    async fn save_sequence<T: Serialize>(
        &self,
        key: &'static str,
        items: &[T],
    ) -> Result<(), RepositoryError> {
        let data = serde_json::to_string(items)
            .map_err(|source| RepositoryError::Encode { key, source })?;
        self.store.set(key, &data).await?;
        debug!("Saved {} {} records", items.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{state::Category, storage::MemoryStore};
    use chrono::Utc;

    fn repository() -> (Arc<MemoryStore>, TimerRepository) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), TimerRepository::new(store))
    }

    #[tokio::test]
    async fn test_load_from_empty_store() {
        let (_, repo) = repository();
        assert!(repo.load_timers().await.is_empty());
        assert!(repo.load_history().await.is_empty());
        assert_eq!(repo.history_blob().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_timers_round_trip() {
        let (_, repo) = repository();
        let mut running = Timer::new("Run", 60, Category::Workout).unwrap();
        running.toggle();
        running.advance();
        let idle = Timer::new("Read", 1200, Category::Study).unwrap();
        let timers = vec![running, idle];

        repo.save_timers(&timers).await.unwrap();
        assert_eq!(repo.load_timers().await, timers);
    }

    #[tokio::test]
    async fn test_malformed_data_fails_soft() {
        let (store, repo) = repository();
        store.set(TIMERS_KEY, "{not json").await.unwrap();
        store.set(HISTORY_KEY, "[{\"id\": 3}]").await.unwrap();

        assert!(repo.load_timers().await.is_empty());
        assert!(repo.load_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_keeps_undecodable_history() {
        let (store, repo) = repository();
        let seeded = concat!(
            r#"[{"id":"1","name":"Run","category":"Workout","completionTime":"a"},"#,
            r#"{"id":"2","name":"Flow","category":"Yoga","completionTime":"b"}]"#,
        );
        store.set(HISTORY_KEY, seeded).await.unwrap();

        let timer = Timer::new("Focus", 5, Category::Study).unwrap();
        let result = repo
            .append_history(HistoryEntry::from_completion(&timer, Utc::now()))
            .await;

        assert!(matches!(result, Err(RepositoryError::Decode { key: HISTORY_KEY, .. })));
        assert_eq!(store.get(HISTORY_KEY).await.unwrap().as_deref(), Some(seeded));

        // Display still shows the records that decode
        let history = repo.load_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "Run");
    }

    #[tokio::test]
    async fn test_unknown_category_fails_soft() {
        let (store, repo) = repository();
        let json = concat!(
            r#"[{"id":"1","name":"x","duration":5,"remainingTime":5,"#,
            r#""isRunning":false,"category":"Nap"}]"#,
        );
        store.set(TIMERS_KEY, json).await.unwrap();
        assert!(repo.load_timers().await.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_timers_that_decode() {
        let (store, repo) = repository();
        let json = concat!(
            r#"[{"id":"1","name":"Bad","duration":null,"remainingTime":null,"#,
            r#""isRunning":false,"category":"Study"},"#,
            r#"{"id":"2","name":"Good","duration":30,"remainingTime":10,"#,
            r#""isRunning":false,"category":"Break"}]"#,
        );
        store.set(TIMERS_KEY, json).await.unwrap();

        let timers = repo.load_timers().await;
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].name, "Good");
        assert_eq!(timers[0].remaining_seconds, 10);
    }

    #[tokio::test]
    async fn test_reads_legacy_layout() {
        let (store, repo) = repository();
        let json = concat!(
            r#"[{"id":"1700000000000","name":"Squats","duration":30,"remainingTime":12,"#,
            r#""isRunning":true,"category":"Workout"}]"#,
        );
        store.set(TIMERS_KEY, json).await.unwrap();

        let timers = repo.load_timers().await;
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].id, "1700000000000");
        assert_eq!(timers[0].remaining_seconds, 12);
        assert!(timers[0].is_running);
    }

    #[tokio::test]
    async fn test_append_history_preserves_order() {
        let (_, repo) = repository();
        let first = Timer::new("first", 1, Category::Break).unwrap();
        let second = Timer::new("second", 1, Category::Study).unwrap();

        repo.append_history(HistoryEntry::from_completion(&first, Utc::now()))
            .await
            .unwrap();
        repo.append_history(HistoryEntry::from_completion(&second, Utc::now()))
            .await
            .unwrap();

        let names: Vec<_> = repo.load_history().await.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["first", "second"]);

        let blob = repo.history_blob().await.unwrap().unwrap();
        assert!(blob.starts_with('['));
        assert!(blob.contains("\"completionTime\""));
    }
}
