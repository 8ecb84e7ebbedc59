//! The economy ledger persisted through the JSON file store.

mod common;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use common::fixtures::{OTHER_USER_ID, SAMPLE_USER_ID};
use maestro::commands::economy::ledger::{Economy, EconomyError, STARTING_BALANCE, STORE_KEY};
use maestro::utils::storage::{JsonFileStore, KeyValueStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_document_layout_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("data")));
    let economy = Economy::load(store.clone()).await.unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    economy.claim_daily(SAMPLE_USER_ID, 100, now).await.unwrap();

    assert!(dir.path().join("data").join("economy_data.json").exists());
    let document = store.load(STORE_KEY).await.unwrap().unwrap();
    let account = &document[SAMPLE_USER_ID.to_string()];
    assert_eq!(account["balance"], STARTING_BALANCE + 100);
    assert_eq!(account["transactions"][0]["type"], "daily");
    assert_eq!(account["transactions"][0]["amount"], 100);
}

#[tokio::test]
async fn test_transfers_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    {
        let economy = Economy::load(Arc::new(JsonFileStore::new(dir.path())))
            .await
            .unwrap();
        assert_ok!(economy.pay(SAMPLE_USER_ID, OTHER_USER_ID, 60, now).await);
        assert_err!(economy.pay(SAMPLE_USER_ID, SAMPLE_USER_ID, 1, now).await);
    }

    let economy = Economy::load(Arc::new(JsonFileStore::new(dir.path())))
        .await
        .unwrap();
    assert_eq!(economy.balance(SAMPLE_USER_ID).await, STARTING_BALANCE - 60);
    assert_eq!(economy.balance(OTHER_USER_ID).await, STARTING_BALANCE + 60);
    assert_eq!(
        economy.leaderboard(1).await,
        vec![(OTHER_USER_ID, STARTING_BALANCE + 60)]
    );
    assert_matches!(
        economy.pay(SAMPLE_USER_ID, OTHER_USER_ID, 41, now).await,
        Err(EconomyError::InsufficientFunds { balance: 40 })
    );
}

#[tokio::test]
async fn test_existing_economy_file_is_kept_across_the_first_write() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("economy_data.json"),
        r#"{
    "111": {
        "balance": 5000,
        "last_daily": "2024-05-01T08:00:00.123456",
        "last_work": null,
        "transactions": []
    },
    "222": {
        "balance": 900,
        "last_daily": null,
        "last_work": null,
        "transactions": []
    }
}"#,
    )
    .unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let economy = Economy::load(Arc::new(JsonFileStore::new(dir.path())))
        .await
        .unwrap();
    assert_eq!(economy.balance(111).await, 5000);
    assert_eq!(economy.balance(222).await, 900);
    assert_ok!(economy.work(333, "cook", 30, now).await);

    let reloaded = Economy::load(Arc::new(JsonFileStore::new(dir.path())))
        .await
        .unwrap();
    assert_eq!(
        reloaded.leaderboard(10).await,
        vec![(111, 5000), (222, 900), (333, STARTING_BALANCE + 30)]
    );
}
