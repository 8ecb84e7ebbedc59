//! Balances, cooldown rewards and transfers, persisted as a single document
//! in the key-value store.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::utils::storage::{KeyValueStore, StorageError};
use crate::utils::timestamp;

/// Key of the economy document in the store
pub const STORE_KEY: &str = "economy_data";

/// Balance every new account starts with
pub const STARTING_BALANCE: i64 = 100;

/// Transactions kept per account; older entries are dropped
pub const HISTORY_LIMIT: usize = 200;

pub const DAILY_REWARD: RangeInclusive<i64> = 50..=150;
pub const WORK_SALARY: RangeInclusive<i64> = 20..=80;
pub const MAX_TRANSFER: i64 = 10_000;

pub const JOBS: &[&str] = &[
    "developer",
    "cook",
    "doctor",
    "professor",
    "artist",
    "musician",
    "streamer",
    "youtuber",
];

fn daily_cooldown() -> TimeDelta {
    TimeDelta::hours(24)
}

fn work_cooldown() -> TimeDelta {
    TimeDelta::hours(1)
}

/// Errors that can occur during economy operations
#[derive(Error, Debug)]
pub enum EconomyError {
    #[error("Not available again until {}", .next.format("%H:%M UTC"))]
    Cooldown { next: DateTime<Utc> },

    #[error("Insufficient funds (balance: {balance})")]
    InsufficientFunds { balance: i64 },

    #[error("You can't send money to yourself")]
    SelfTransfer,

    #[error("Amount must be between 1 and 10000, got {0}")]
    InvalidAmount(i64),

    #[error("The account of user {0} could not be read and is locked until the economy file is repaired")]
    UnreadableAccount(u64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EconomyResult<T> = Result<T, EconomyError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Daily,
    Work,
    PaySent,
    PayReceived,
    /// Kinds this bot never records (gambling, admin edits) but older files hold
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => f.write_str("daily"),
            Self::Work => f.write_str("work"),
            Self::PaySent => f.write_str("pay_sent"),
            Self::PayReceived => f.write_str("pay_received"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: i64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub balance: i64,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub last_daily: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    pub last_work: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            balance: STARTING_BALANCE,
            last_daily: None,
            last_work: None,
            transactions: Vec::new(),
        }
    }
}

impl Account {
    fn record(&mut self, time: DateTime<Utc>, kind: TransactionKind, amount: i64, note: String) {
        self.transactions.push(Transaction {
            time,
            kind,
            amount,
            note,
        });
        if self.transactions.len() > HISTORY_LIMIT {
            let excess = self.transactions.len() - HISTORY_LIMIT;
            self.transactions.drain(..excess);
        }
    }

    fn check_cooldown(
        last: Option<DateTime<Utc>>,
        cooldown: TimeDelta,
        now: DateTime<Utc>,
    ) -> EconomyResult<()> {
        match last {
            Some(last) if now - last < cooldown => Err(EconomyError::Cooldown {
                next: last + cooldown,
            }),
            _ => Ok(()),
        }
    }
}

/// Result of a successful daily claim or shift of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub amount: i64,
    pub balance: i64,
}

/// Accounts keyed by the user id as a decimal string
type Accounts = BTreeMap<String, Account>;

/// Everything loaded from the document. Entries that don't parse as an
/// [`Account`] are kept verbatim and written back untouched.
#[derive(Default)]
struct LedgerState {
    accounts: Accounts,
    unreadable: BTreeMap<String, Value>,
}

impl LedgerState {
    fn from_document(document: Value) -> EconomyResult<Self> {
        let entries: BTreeMap<String, Value> =
            serde_json::from_value(document).map_err(corrupt)?;

        let mut state = Self::default();
        for (id, entry) in entries {
            match serde_json::from_value::<Account>(entry.clone()) {
                Ok(account) => {
                    state.accounts.insert(id, account);
                }
                Err(e) => {
                    error!("Economy account {} could not be read, keeping it as is: {}", id, e);
                    state.unreadable.insert(id, entry);
                }
            }
        }
        Ok(state)
    }
}

fn corrupt(source: serde_json::Error) -> StorageError {
    StorageError::Corrupt {
        key: STORE_KEY.to_string(),
        source,
    }
}

/// Working copy of the accounts for one change. Only swapped in once saved.
struct Draft<'a> {
    accounts: Accounts,
    unreadable: &'a BTreeMap<String, Value>,
}

impl Draft<'_> {
    fn account(&mut self, user_id: u64) -> EconomyResult<&mut Account> {
        let key = user_id.to_string();
        if self.unreadable.contains_key(&key) {
            return Err(EconomyError::UnreadableAccount(user_id));
        }
        Ok(self.accounts.entry(key).or_default())
    }
}

/// The economy ledger. All accounts live in memory and the whole document is
/// written back to the store after every change.
pub struct Economy {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<LedgerState>,
}

impl Economy {
    /// Load the ledger from the store. A document that isn't JSON, or isn't an
    /// object of accounts, is an error so it never gets overwritten.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> EconomyResult<Self> {
        let state = match store.load(STORE_KEY).await? {
            Some(document) => LedgerState::from_document(document)?,
            None => LedgerState::default(),
        };

        info!(
            "Loaded {} economy accounts ({} unreadable)",
            state.accounts.len(),
            state.unreadable.len()
        );
        Ok(Self {
            store,
            state: Mutex::new(state),
        })
    }

    async fn persist(
        &self,
        accounts: &Accounts,
        unreadable: &BTreeMap<String, Value>,
    ) -> EconomyResult<()> {
        let mut document: Map<String, Value> = unreadable.clone().into_iter().collect();
        for (id, account) in accounts {
            document.insert(id.clone(), serde_json::to_value(account).map_err(corrupt)?);
        }
        self.store.save(STORE_KEY, &Value::Object(document)).await?;
        Ok(())
    }

    /// Apply `change` to a copy of the accounts and keep it only if the save
    /// succeeds. A failed save leaves the ledger exactly as it was.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Draft<'_>) -> EconomyResult<T>,
    ) -> EconomyResult<T> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let mut draft = Draft {
            accounts: state.accounts.clone(),
            unreadable: &state.unreadable,
        };
        let outcome = change(&mut draft)?;
        self.persist(&draft.accounts, &state.unreadable).await?;

        state.accounts = draft.accounts;
        Ok(outcome)
    }

    /// Current balance; users without an account have the starting balance
    pub async fn balance(&self, user_id: u64) -> i64 {
        self.state
            .lock()
            .await
            .accounts
            .get(&user_id.to_string())
            .map(|account| account.balance)
            .unwrap_or(STARTING_BALANCE)
    }

    /// Claim the daily reward. Available once every 24 hours.
    pub async fn claim_daily(
        &self,
        user_id: u64,
        reward: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<Payout> {
        let payout = self
            .commit(|draft| {
                let account = draft.account(user_id)?;
                Account::check_cooldown(account.last_daily, daily_cooldown(), now)?;

                account.balance += reward;
                account.last_daily = Some(now);
                account.record(now, TransactionKind::Daily, reward, "Daily reward".to_string());
                Ok(Payout {
                    amount: reward,
                    balance: account.balance,
                })
            })
            .await?;

        info!("User {} claimed a daily reward of {}", user_id, reward);
        Ok(payout)
    }

    /// Work a shift as `job`. Available once every hour.
    pub async fn work(
        &self,
        user_id: u64,
        job: &str,
        salary: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<Payout> {
        let payout = self
            .commit(|draft| {
                let account = draft.account(user_id)?;
                Account::check_cooldown(account.last_work, work_cooldown(), now)?;

                account.balance += salary;
                account.last_work = Some(now);
                account.record(now, TransactionKind::Work, salary, format!("Worked as {}", job));
                Ok(Payout {
                    amount: salary,
                    balance: account.balance,
                })
            })
            .await?;

        info!("User {} worked as {} for {}", user_id, job, salary);
        Ok(payout)
    }

    /// Move `amount` from one user to another. Returns the sender's new balance.
    pub async fn pay(
        &self,
        from: u64,
        to: u64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> EconomyResult<i64> {
        if !(1..=MAX_TRANSFER).contains(&amount) {
            return Err(EconomyError::InvalidAmount(amount));
        }
        if from == to {
            return Err(EconomyError::SelfTransfer);
        }

        let sender_balance = self
            .commit(|draft| {
                // Both accounts must be usable before either changes
                draft.account(to)?;

                let sender = draft.account(from)?;
                if sender.balance < amount {
                    return Err(EconomyError::InsufficientFunds {
                        balance: sender.balance,
                    });
                }
                sender.balance -= amount;
                sender.record(now, TransactionKind::PaySent, -amount, format!("To {}", to));
                let sender_balance = sender.balance;

                let receiver = draft.account(to)?;
                receiver.balance += amount;
                receiver.record(now, TransactionKind::PayReceived, amount, format!("From {}", from));
                Ok(sender_balance)
            })
            .await?;

        info!("User {} paid {} to user {}", from, amount, to);
        Ok(sender_balance)
    }

    /// Richest accounts first; ties are broken by user id
    pub async fn leaderboard(&self, limit: usize) -> Vec<(u64, i64)> {
        let state = self.state.lock().await;

        let mut ranked: Vec<(u64, i64)> = state
            .accounts
            .iter()
            .filter_map(|(id, account)| match id.parse::<u64>() {
                Ok(id) => Some((id, account.balance)),
                Err(_) => {
                    debug!("Skipping economy account with invalid id '{}'", id);
                    None
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Most recent transactions first
    pub async fn statement(&self, user_id: u64, limit: usize) -> Vec<Transaction> {
        let state = self.state.lock().await;
        state
            .accounts
            .get(&user_id.to_string())
            .map(|account| {
                account
                    .transactions
                    .iter()
                    .rev()
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
