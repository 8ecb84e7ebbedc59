//! Per-guild warning history, persisted as one document in the key-value store.
//! The document maps guild id to user id to the list of warnings, both ids as
//! decimal strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::utils::storage::{KeyValueStore, StorageError};
use crate::utils::timestamp;

/// Key of the warnings document in the store
pub const STORE_KEY: &str = "warnings";

/// Members reaching this many warnings are kicked automatically
pub const AUTO_KICK_THRESHOLD: usize = 3;

#[derive(Error, Debug)]
pub enum WarningError {
    #[error("You can't warn yourself")]
    SelfWarning,

    #[error("This member has no warnings")]
    NoWarnings,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type WarningResult<T> = Result<T, WarningError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// User id of the moderator, kept as a string like the rest of the document
    pub moderator: String,
    pub reason: String,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Warning {
    pub fn moderator_id(&self) -> Option<u64> {
        self.moderator.parse().ok()
    }
}

type Warnings = BTreeMap<String, BTreeMap<String, Vec<Warning>>>;

pub struct WarningLedger {
    store: Arc<dyn KeyValueStore>,
    warnings: Mutex<Warnings>,
}

impl WarningLedger {
    /// Load the warnings from the store. A document that doesn't parse is an
    /// error so it is never replaced.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> WarningResult<Self> {
        let warnings = match store.load(STORE_KEY).await? {
            Some(document) => serde_json::from_value::<Warnings>(document).map_err(corrupt)?,
            None => Warnings::new(),
        };

        info!("Loaded warnings for {} guilds", warnings.len());
        Ok(Self {
            store,
            warnings: Mutex::new(warnings),
        })
    }

    /// Apply `change` to a copy and keep it only once it is saved
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Warnings) -> WarningResult<T>,
    ) -> WarningResult<T> {
        let mut warnings = self.warnings.lock().await;

        let mut draft = warnings.clone();
        let outcome = change(&mut draft)?;
        let document = serde_json::to_value(&draft).map_err(corrupt)?;
        self.store.save(STORE_KEY, &document).await?;

        *warnings = draft;
        Ok(outcome)
    }

    /// Record a warning. Returns how many warnings the member now has.
    pub async fn warn(
        &self,
        guild_id: u64,
        user_id: u64,
        moderator_id: u64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> WarningResult<usize> {
        if user_id == moderator_id {
            return Err(WarningError::SelfWarning);
        }

        let count = self
            .commit(|warnings| {
                let history = warnings
                    .entry(guild_id.to_string())
                    .or_default()
                    .entry(user_id.to_string())
                    .or_default();
                history.push(Warning {
                    moderator: moderator_id.to_string(),
                    reason: reason.to_string(),
                    timestamp: Some(now),
                });
                Ok(history.len())
            })
            .await?;

        info!(
            "User {} warned user {} in guild {} ({} warnings)",
            moderator_id, user_id, guild_id, count
        );
        Ok(count)
    }

    /// Warnings of a member in a guild, oldest first
    pub async fn warnings(&self, guild_id: u64, user_id: u64) -> Vec<Warning> {
        self.warnings
            .lock()
            .await
            .get(&guild_id.to_string())
            .and_then(|guild| guild.get(&user_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Forget every warning of a member. Returns how many were removed.
    pub async fn clear(&self, guild_id: u64, user_id: u64) -> WarningResult<usize> {
        let removed = self
            .commit(|warnings| {
                warnings
                    .get_mut(&guild_id.to_string())
                    .and_then(|guild| guild.remove(&user_id.to_string()))
                    .map(|history| history.len())
                    .ok_or(WarningError::NoWarnings)
            })
            .await?;

        info!(
            "Cleared {} warnings of user {} in guild {}",
            removed, user_id, guild_id
        );
        Ok(removed)
    }
}

fn corrupt(source: serde_json::Error) -> StorageError {
    StorageError::Corrupt {
        key: STORE_KEY.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::storage::{JsonFileStore, StorageResult};
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use serenity::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    // `assert_matches!` needs the `Ok` type to be `Debug`.
    impl std::fmt::Debug for WarningLedger {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("WarningLedger").finish_non_exhaustive()
        }
    }

    const GUILD: u64 = 10;
    const OTHER_GUILD: u64 = 20;
    const MODERATOR: u64 = 1;

    /// In-memory store; saves fail while `failing` is set
    #[derive(Default)]
    struct MemoryStore {
        documents: StdMutex<BTreeMap<String, Value>>,
        failing: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn load(&self, key: &str) -> StorageResult<Option<Value>> {
            Ok(self.documents.lock().unwrap().get(key).cloned())
        }

        async fn save(&self, key: &str, value: &Value) -> StorageResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.documents
                .lock()
                .unwrap()
                .insert(key.to_string(), value.clone());
            Ok(())
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    async fn ledger() -> (WarningLedger, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let ledger = WarningLedger::load(store.clone()).await.unwrap();
        (ledger, store)
    }

    #[tokio::test]
    async fn test_warnings_accumulate_per_member() {
        let (ledger, _) = ledger().await;

        assert_eq!(ledger.warn(GUILD, 5, MODERATOR, "spam", at(8)).await.unwrap(), 1);
        assert_eq!(ledger.warn(GUILD, 5, MODERATOR, "caps", at(9)).await.unwrap(), 2);
        assert_eq!(ledger.warn(GUILD, 6, MODERATOR, "spam", at(9)).await.unwrap(), 1);

        let history = ledger.warnings(GUILD, 5).await;
        let reasons: Vec<&str> = history.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(reasons, vec!["spam", "caps"]);
        assert_eq!(history[0].moderator_id(), Some(MODERATOR));
        assert_eq!(history[1].timestamp, Some(at(9)));
    }

    #[tokio::test]
    async fn test_guilds_keep_separate_histories() {
        let (ledger, _) = ledger().await;
        ledger.warn(GUILD, 5, MODERATOR, "spam", at(8)).await.unwrap();

        assert!(ledger.warnings(OTHER_GUILD, 5).await.is_empty());
        assert_eq!(
            ledger.warn(OTHER_GUILD, 5, MODERATOR, "spam", at(8)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_self_warning_is_rejected() {
        let (ledger, store) = ledger().await;

        assert_matches!(
            ledger.warn(GUILD, MODERATOR, MODERATOR, "oops", at(8)).await,
            Err(WarningError::SelfWarning)
        );
        assert!(store.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_only_that_member() {
        let (ledger, store) = ledger().await;
        ledger.warn(GUILD, 5, MODERATOR, "spam", at(8)).await.unwrap();
        ledger.warn(GUILD, 5, MODERATOR, "spam", at(9)).await.unwrap();
        ledger.warn(GUILD, 6, MODERATOR, "spam", at(9)).await.unwrap();

        assert_eq!(ledger.clear(GUILD, 5).await.unwrap(), 2);
        assert!(ledger.warnings(GUILD, 5).await.is_empty());
        assert_eq!(ledger.warnings(GUILD, 6).await.len(), 1);
        assert_matches!(ledger.clear(GUILD, 5).await, Err(WarningError::NoWarnings));

        let document = store.load(STORE_KEY).await.unwrap().unwrap();
        assert!(document["10"].get("5").is_none());
        assert_eq!(document["10"]["6"][0]["reason"], "spam");
    }

    #[tokio::test]
    async fn test_failed_save_records_nothing() {
        let (ledger, store) = ledger().await;
        ledger.warn(GUILD, 5, MODERATOR, "spam", at(8)).await.unwrap();
        store.failing.store(true, Ordering::SeqCst);

        assert_matches!(
            ledger.warn(GUILD, 5, MODERATOR, "again", at(9)).await,
            Err(WarningError::Storage(_))
        );
        assert_matches!(ledger.clear(GUILD, 5).await, Err(WarningError::Storage(_)));
        assert_eq!(ledger.warnings(GUILD, 5).await.len(), 1);
    }

    #[tokio::test]
    async fn test_reads_existing_warning_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("warnings.json"),
            json!({
                "10": {
                    "5": [
                        {"moderator": "1", "reason": "spam", "timestamp": "2024-05-01T08:00:00.000000+00:00"},
                        {"moderator": "2", "reason": "caps"}
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

        let ledger = WarningLedger::load(Arc::new(JsonFileStore::new(dir.path())))
            .await
            .unwrap();
        let history = ledger.warnings(GUILD, 5).await;

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp, Some(at(8)));
        assert_eq!(history[1].timestamp, None);
        assert_eq!(
            ledger.warn(GUILD, 5, MODERATOR, "third", at(10)).await.unwrap(),
            AUTO_KICK_THRESHOLD
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("warnings.json"), r#"{"10": []}"#).unwrap();

        assert_matches!(
            WarningLedger::load(Arc::new(JsonFileStore::new(dir.path()))).await,
            Err(WarningError::Storage(StorageError::Corrupt { .. }))
        );
    }
}
