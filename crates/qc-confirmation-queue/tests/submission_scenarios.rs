//! # Submission Scenarios for the Confirmation Queue
//!
//! Drives the public API the way a node does: several submitters sharing
//! one store, a scheduler standing in for the head advancement worker.
//!
//! ## Test Categories
//!
//! 1. **Lost Updates** - concurrent distinct submissions
//! 2. **Dedup** - concurrent and sequential resubmission
//! 3. **Balance Set** - duplicate accounts, lock counts
//! 4. **Trigger** - head comparison after enqueue

use async_trait::async_trait;
use parking_lot::Mutex;
use qc_confirmation_queue::{
    BalanceSetViolation, CasOutcome, ConfirmationBlockApi, ConfirmationBlockService,
    HeadAdvancementRequest, HeadAdvancementScheduler, InMemoryStore, QueueConfig, ScheduleError,
    SharedStore, StoreError, SubmitError, TriggerDecision, UnvalidatedConfirmationBlock,
    ValidationError,
};
use serde_json::{json, Value};
use std::sync::Arc;

// =============================================================================
// TEST HELPERS
// =============================================================================

#[derive(Default)]
struct RecordingScheduler {
    requests: Mutex<Vec<HeadAdvancementRequest>>,
}

impl HeadAdvancementScheduler for RecordingScheduler {
    fn schedule(&self, request: HeadAdvancementRequest) -> Result<(), ScheduleError> {
        self.requests.lock().push(request);
        Ok(())
    }
}

/// Store that yields between every call so submitters interleave.
#[derive(Default)]
struct InterleavingStore {
    inner: InMemoryStore,
}

#[async_trait]
impl SharedStore for InterleavingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.inner.set(key, value).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        replacement: Option<Vec<u8>>,
    ) -> Result<CasOutcome, StoreError> {
        tokio::task::yield_now().await;
        self.inner.compare_and_set(key, expected, replacement).await
    }
}

fn contended_config() -> QueueConfig {
    QueueConfig {
        max_enqueue_attempts: 64,
        initial_backoff_ms: 0,
        max_backoff_ms: 1,
        ..Default::default()
    }
}

async fn make_service(head: Option<&str>) -> (Arc<ConfirmationBlockService>, Arc<RecordingScheduler>) {
    let store: Arc<dyn SharedStore> = Arc::new(InterleavingStore::default());
    let scheduler = Arc::new(RecordingScheduler::default());
    let service = Arc::new(ConfirmationBlockService::from_config(
        store.clone(),
        scheduler.clone(),
        &contended_config(),
    ));
    if let Some(head) = head {
        store
            .set(&contended_config().head_key, head.as_bytes().to_vec())
            .await
            .unwrap();
    }
    (service, scheduler)
}

fn make_block(identifier: &str, balances: Value) -> UnvalidatedConfirmationBlock {
    serde_json::from_value(json!({
        "block": {
            "account_number": "a".repeat(64),
            "message": {
                "balance_key": "b".repeat(64),
                "txs": [
                    { "amount": 90, "recipient": "c".repeat(64) },
                    { "amount": 1, "recipient": "f".repeat(64), "fee": "PRIMARY_VALIDATOR" }
                ]
            },
            "signature": "d".repeat(128)
        },
        "block_identifier": identifier,
        "updated_balances": balances
    }))
    .unwrap()
}

fn valid_block(identifier: &str) -> UnvalidatedConfirmationBlock {
    make_block(
        identifier,
        json!([
            { "account_number": "a".repeat(64), "balance": "9.0000000000000001", "balance_lock": "e".repeat(64) },
            { "account_number": "c".repeat(64), "balance": "90" },
            { "account_number": "f".repeat(64), "balance": 1 }
        ]),
    )
}

async fn resident_ids(service: &ConfirmationBlockService) -> Vec<String> {
    service
        .pending_blocks()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.block_identifier.into_inner())
        .collect()
}

// =============================================================================
// LOST UPDATES
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_blocks_all_enqueued_once() {
    let (service, _) = make_service(None).await;

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.submit(valid_block(&format!("B{i}"))).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut ids = resident_ids(&service).await;
    ids.sort();
    let mut expected: Vec<String> = (0..24).map(|i| format!("B{i}")).collect();
    expected.sort();
    assert_eq!(ids, expected);
}

// =============================================================================
// DEDUP
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_identifier_first_writer_wins() {
    let (service, _) = make_service(None).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.submit(valid_block("X")).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(SubmitError::Validation(ValidationError::DuplicateBlock(id))) => {
                assert_eq!(id.as_str(), "X");
            }
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(resident_ids(&service).await, vec!["X"]);
}

#[tokio::test]
async fn test_verbatim_resubmission_leaves_queue_unchanged() {
    let (service, scheduler) = make_service(Some("H0")).await;
    service.submit(valid_block("A")).await.unwrap();
    service.submit(valid_block("B")).await.unwrap();

    let stored = service.pending_blocks().await.unwrap();
    let err = service
        .submit(UnvalidatedConfirmationBlock::from(&stored[0]))
        .await
        .unwrap_err();

    assert_eq!(err.rule(), "duplicate_block");
    assert_eq!(err.field(), Some("block_identifier"));
    assert_eq!(resident_ids(&service).await, vec!["A", "B"]);
    assert!(scheduler.requests.lock().is_empty());
}

// =============================================================================
// BALANCE SET
// =============================================================================

#[tokio::test]
async fn test_duplicate_account_rejected_regardless_of_locks() {
    let (service, _) = make_service(None).await;
    let account = "c".repeat(64);

    for locks in [(None, None), (Some("e".repeat(64)), None), (Some("e".repeat(64)), Some("g".repeat(64)))] {
        let block = make_block(
            "D",
            json!([
                { "account_number": account, "balance": "1", "balance_lock": locks.0 },
                { "account_number": account, "balance": "2", "balance_lock": locks.1 }
            ]),
        );
        let err = service.submit(block).await.unwrap_err();
        match err {
            SubmitError::Validation(ValidationError::InvalidBalanceSet(violation)) => {
                assert_eq!(violation.sub_reason(), "duplicate_account");
            }
            other => panic!("unexpected rejection: {other}"),
        }
    }
    assert!(resident_ids(&service).await.is_empty());
}

#[tokio::test]
async fn test_lock_count_must_be_exactly_one() {
    let (service, _) = make_service(None).await;
    let lock = "e".repeat(64);

    let cases = [
        (json!([]), Some(0)),
        (
            json!([
                { "account_number": "a".repeat(64), "balance": "1" },
                { "account_number": "c".repeat(64), "balance": "2" }
            ]),
            Some(0),
        ),
        (
            json!([
                { "account_number": "a".repeat(64), "balance": "1", "balance_lock": lock },
                { "account_number": "c".repeat(64), "balance": "2", "balance_lock": lock }
            ]),
            Some(2),
        ),
        (
            json!([
                { "account_number": "a".repeat(64), "balance": "1", "balance_lock": lock },
                { "account_number": "c".repeat(64), "balance": "2", "balance_lock": null }
            ]),
            None,
        ),
    ];

    for (i, (balances, expected_found)) in cases.into_iter().enumerate() {
        let result = service.submit(make_block(&format!("L{i}"), balances)).await;
        match expected_found {
            Some(found) => assert_eq!(
                result.unwrap_err(),
                SubmitError::Validation(ValidationError::InvalidBalanceSet(
                    BalanceSetViolation::WrongLockCount { found }
                ))
            ),
            None => assert!(result.is_ok()),
        }
    }
    assert_eq!(resident_ids(&service).await, vec!["L3"]);
}

#[tokio::test]
async fn test_structural_error_names_field() {
    let (service, _) = make_service(None).await;
    let block = make_block(
        "S",
        json!([
            { "account_number": "a".repeat(64), "balance": "1.00000000000000001", "balance_lock": "e".repeat(64) }
        ]),
    );

    let err = service.submit(block).await.unwrap_err();

    assert_eq!(err.rule(), "structural");
    assert_eq!(err.field(), Some("updated_balances[0].balance"));
}

// =============================================================================
// TRIGGER
// =============================================================================

#[tokio::test]
async fn test_block_matching_head_schedules_with_head_hash() {
    let (service, scheduler) = make_service(Some("H0")).await;

    let outcome = service.submit(valid_block("H0")).await.unwrap();

    assert_eq!(outcome.queue_depth, 1);
    let requests = scheduler.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].head_block_hash.as_str(), "H0");
    assert_eq!(
        outcome.trigger,
        TriggerDecision::Scheduled {
            correlation_id: requests[0].correlation_id
        }
    );
}

#[tokio::test]
async fn test_block_not_matching_head_is_staged_only() {
    let (service, scheduler) = make_service(Some("H0")).await;
    service.submit(valid_block("A")).await.unwrap();

    let outcome = service.submit(valid_block("B")).await.unwrap();

    assert_eq!(outcome.trigger, TriggerDecision::NoTrigger);
    assert_eq!(outcome.queue_depth, 2);
    assert_eq!(resident_ids(&service).await, vec!["A", "B"]);
    assert!(scheduler.requests.lock().is_empty());
}
