//! End-to-end consolidation runs over local filesystem storage
//!
//! These tests verify that:
//! - Snapshots replace and deltas amend the published table
//! - Rejected batches leave the published bytes untouched
//! - A failed replace keeps the old file and the staging directory
//! - A failed cleanup still counts as a successful run
//! - The ledger keeps consumed batches from being reapplied

mod common;

use common::{FaultyStorage, Workspace, PUBLISHED};
use consolidator::adapters::storage::ObjectStorage;
use consolidator::core::consolidate::RunOutcome;
use consolidator::core::state::LedgerStatus;
use consolidator::core::verification::checksum_bytes;
use consolidator::domain::{BatchKind, ConsolidatorError};
use std::sync::Arc;

const HEADER: &str = "PersonID,FullName,City\n";

async fn seed_snapshot(ws: &Workspace) {
    let batch = ws.deliver("snapshot_001.csv", "1,Amy,NYC\n2,Bo,LA\n");
    ws.coordinator().await.process_batch(&batch, false).await.unwrap();
}

#[tokio::test]
async fn test_snapshot_publishes_exactly_its_rows() {
    let ws = Workspace::new();
    let batch = ws.deliver("snapshot_001.csv", "1,Amy,NYC\n2,Bo,LA\n");

    let summary = ws.coordinator().await.process_batch(&batch, false).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Published);
    assert_eq!(summary.kind, Some(BatchKind::Snapshot));
    assert_eq!(summary.rows_read, 2);
    assert_eq!(
        ws.published().unwrap(),
        format!("{HEADER}1,Amy,NYC\n2,Bo,LA\n")
    );
    assert!(ws.staging_dirs().is_empty());
}

#[tokio::test]
async fn test_delta_updates_inserts_and_deletes() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;

    let batch = ws.deliver("delta_002.csv", "U,1,Amy,SF\nI,3,Cid,LA\nD,2,Bo,LA\n");
    let summary = ws.coordinator().await.process_batch(&batch, false).await.unwrap();

    assert_eq!(summary.kind, Some(BatchKind::Delta));
    assert_eq!(summary.records_before, Some(2));
    assert_eq!(summary.records_after, 2);
    assert_eq!(
        (summary.stats.inserts, summary.stats.updates, summary.stats.deletes),
        (1, 1, 1)
    );
    assert_eq!(
        ws.published().unwrap(),
        format!("{HEADER}1,Amy,SF\n3,Cid,LA\n")
    );
}

#[tokio::test]
async fn test_insert_then_update_same_key_last_wins() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;

    let batch = ws.deliver("delta_002.csv", "I,1,X,Y\nU,1,Z,W\n");
    ws.coordinator().await.process_batch(&batch, false).await.unwrap();

    assert_eq!(
        ws.published().unwrap(),
        format!("{HEADER}1,Z,W\n2,Bo,LA\n")
    );
}

#[tokio::test]
async fn test_snapshot_replaces_previous_state() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;

    let batch = ws.deliver("snapshot_002.csv", "9,Zed,Oslo\n");
    ws.coordinator().await.process_batch(&batch, false).await.unwrap();

    assert_eq!(ws.published().unwrap(), format!("{HEADER}9,Zed,Oslo\n"));
}

#[tokio::test]
async fn test_five_column_batch_is_rejected() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let before = ws.published().unwrap();

    let batch = ws.deliver("bad.csv", "U,1,Amy,SF,extra\n");
    let err = ws
        .coordinator()
        .await
        .process_batch(&batch, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConsolidatorError::SchemaMismatch { row: 1, found: 5, .. }
    ));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(ws.published().unwrap(), before);
    assert!(ws.staging_dirs().is_empty());
}

#[tokio::test]
async fn test_ragged_batch_is_rejected_at_offending_row() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let before = ws.published().unwrap();

    let batch = ws.deliver("ragged.csv", "I,3,Cid,LA\nD,2\n");
    let err = ws
        .coordinator()
        .await
        .process_batch(&batch, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ConsolidatorError::SchemaMismatch { row: 2, found: 2, .. }));
    assert_eq!(ws.published().unwrap(), before);
}

#[tokio::test]
async fn test_unrecognized_operation_rejects_whole_batch() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let before = ws.published().unwrap();

    let batch = ws.deliver("delta_002.csv", "I,3,Cid,LA\nX,1,Amy,SF\n");
    let err = ws
        .coordinator()
        .await
        .process_batch(&batch, false)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConsolidatorError::UnrecognizedOperation { row: 2, ref code } if code == "X"
    ));
    assert_eq!(ws.published().unwrap(), before);
}

#[tokio::test]
async fn test_delta_before_any_snapshot() {
    let ws = Workspace::new();
    let batch = ws.deliver("delta_001.csv", "I,1,Amy,NYC\n");

    let err = ws
        .coordinator()
        .await
        .process_batch(&batch, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ConsolidatorError::NoBaseState));
    assert!(ws.published().is_none());
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let ws = Workspace::new();
    let batch = ws.deliver("empty.csv", "");

    let err = ws
        .coordinator()
        .await
        .process_batch(&batch, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ConsolidatorError::SchemaMismatch { row: 0, found: 0, .. }));
}

#[tokio::test]
async fn test_input_header_is_skipped_when_configured() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.input.has_header = true;
    config.output.write_header = false;

    let batch = ws.deliver("snapshot.csv", "PersonID,FullName,City\n1,Amy,NYC\n");
    let coordinator = ws.coordinator_with(config, Arc::new(ws.storage().await));
    coordinator.process_batch(&batch, false).await.unwrap();

    assert_eq!(ws.published().unwrap(), "1,Amy,NYC\n");
}

#[tokio::test]
async fn test_failed_replace_keeps_published_file_and_staging() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let before = ws.published().unwrap();

    let storage = FaultyStorage::new(Arc::new(ws.storage().await)).failing_replace_into(PUBLISHED);
    let coordinator = ws.coordinator_with(ws.config(), Arc::new(storage));
    let batch = ws.deliver("delta_002.csv", "U,1,Amy,SF\n");

    let err = coordinator.process_batch(&batch, false).await.unwrap_err();

    assert!(matches!(err, ConsolidatorError::PublishFailure(_)));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(ws.published().unwrap(), before);

    let staging = ws.staging_dirs();
    assert_eq!(staging.len(), 1);
    let part = ws
        .root()
        .join("des_file")
        .join(&staging[0])
        .join("part-00000.csv");
    assert_eq!(
        std::fs::read_to_string(part).unwrap(),
        format!("{HEADER}1,Amy,SF\n2,Bo,LA\n")
    );

    let ledger = coordinator.ledger().unwrap().load().await.unwrap();
    assert_eq!(
        ledger.get(&batch).map(|e| e.status),
        Some(LedgerStatus::Failed)
    );
}

#[tokio::test]
async fn test_failed_replace_without_retention_removes_staging() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;

    let mut config = ws.config();
    config.publish.retain_staging_on_failure = false;
    let storage = FaultyStorage::new(Arc::new(ws.storage().await)).failing_replace_into(PUBLISHED);
    let coordinator = ws.coordinator_with(config, Arc::new(storage));
    let batch = ws.deliver("delta_002.csv", "U,1,Amy,SF\n");

    assert!(coordinator.process_batch(&batch, false).await.is_err());
    assert!(ws.staging_dirs().is_empty());
}

#[tokio::test]
async fn test_failed_cleanup_is_a_warning() {
    let ws = Workspace::new();
    let storage = FaultyStorage::new(Arc::new(ws.storage().await)).failing_delete();
    let coordinator = ws.coordinator_with(ws.config(), Arc::new(storage));
    let batch = ws.deliver("snapshot_001.csv", "1,Amy,NYC\n");

    let summary = coordinator.process_batch(&batch, false).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Published);
    assert!(summary.receipt.as_ref().unwrap().leaked_staging());
    assert!(!summary.is_clean());
    assert_eq!(ws.published().unwrap(), format!("{HEADER}1,Amy,NYC\n"));
    assert_eq!(ws.staging_dirs().len(), 1);

    // A later cleanup with working storage removes the leak
    let healthy = ws.coordinator().await;
    let removed = healthy.writer().cleanup_leaked_staging().await.unwrap();
    assert_eq!(removed.len(), 1);
    assert!(ws.staging_dirs().is_empty());
    assert!(ws.published().is_some());
}

#[tokio::test]
async fn test_completed_batch_is_skipped_unless_forced() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;

    let delta = ws.deliver("delta_002.csv", "I,3,Cid,LA\n");
    let coordinator = ws.coordinator().await;
    coordinator.process_batch(&delta, false).await.unwrap();

    // Re-delivering the old snapshot must not revert the delta
    let snapshot = "snapshot_001.csv".parse().unwrap();
    let summary = coordinator.process_batch(&snapshot, false).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Skipped);
    assert!(ws.published().unwrap().contains("3,Cid,LA"));

    let summary = coordinator.process_batch(&snapshot, true).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Published);
    assert!(!ws.published().unwrap().contains("3,Cid,LA"));
}

#[tokio::test]
async fn test_redelivered_batch_with_new_content_is_reprocessed() {
    let ws = Workspace::new();
    let batch = ws.deliver("LOAD00000001.csv", "1,Amy,NYC\n");
    let coordinator = ws.coordinator().await;
    coordinator.process_batch(&batch, false).await.unwrap();

    // Same name, rewritten upstream
    ws.deliver("LOAD00000001.csv", "1,Amy,SF\n2,Bo,LA\n");
    let summary = coordinator.process_batch(&batch, false).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Published);
    assert!(!summary.is_clean());
    assert!(summary.warnings[0].contains("different content"));
    assert_eq!(
        ws.published().unwrap(),
        format!("{HEADER}1,Amy,SF\n2,Bo,LA\n")
    );

    let ledger = coordinator.ledger().unwrap().load().await.unwrap();
    let entry = ledger.get(&batch).unwrap();
    assert_eq!(entry.run_id, summary.run_id);
    assert_eq!(
        entry.input_checksum.as_deref(),
        Some(checksum_bytes(b"1,Amy,SF\n2,Bo,LA\n").as_str())
    );

    // Delivering the rewritten content again is a plain skip
    let summary = coordinator.process_batch(&batch, false).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Skipped);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_corrupt_ledger_does_not_block_runs() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    std::fs::write(ws.root().join("des_file").join("_ledger.json"), "{ not json").unwrap();

    let batch = ws.deliver("delta_002.csv", "I,3,Cid,LA\n");
    let summary = ws.coordinator().await.process_batch(&batch, false).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Published);
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("Ledger unreadable")));
    assert!(ws.published().unwrap().contains("3,Cid,LA"));
}

#[tokio::test]
async fn test_ledger_records_checksum_of_published_bytes() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;

    let coordinator = ws.coordinator().await;
    let ledger = coordinator.ledger().unwrap().load().await.unwrap();
    let entry = ledger.get(&"snapshot_001.csv".parse().unwrap()).unwrap();

    assert_eq!(entry.status, LedgerStatus::Completed);
    assert_eq!(entry.kind, Some(BatchKind::Snapshot));
    assert_eq!(
        entry.input_checksum.as_deref(),
        Some(checksum_bytes(b"1,Amy,NYC\n2,Bo,LA\n").as_str())
    );
    assert_eq!(entry.records_published, 2);
    assert_eq!(
        entry.checksum.as_deref(),
        Some(checksum_bytes(ws.published().unwrap().as_bytes()).as_str())
    );
}

#[tokio::test]
async fn test_ledger_disabled_reprocesses_and_writes_no_ledger() {
    let ws = Workspace::new();
    let mut config = ws.config();
    config.ledger.enabled = false;
    let coordinator = ws.coordinator_with(config, Arc::new(ws.storage().await));
    let batch = ws.deliver("snapshot_001.csv", "1,Amy,NYC\n");

    coordinator.process_batch(&batch, false).await.unwrap();
    let again = coordinator.process_batch(&batch, false).await.unwrap();

    assert_eq!(again.outcome, RunOutcome::Published);
    assert_eq!(ws.output_entries(), vec!["final_output.csv"]);
}

#[tokio::test]
async fn test_dry_run_leaves_storage_untouched() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let before = ws.published().unwrap();
    let entries_before = ws.output_entries();

    let mut config = ws.config();
    config.application.dry_run = true;
    let coordinator = ws.coordinator_with(config, Arc::new(ws.storage().await));
    let batch = ws.deliver("delta_002.csv", "D,1,Amy,NYC\n");

    let summary = coordinator.process_batch(&batch, false).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::DryRun);
    assert_eq!(summary.records_after, 1);
    assert_eq!(ws.published().unwrap(), before);
    assert_eq!(ws.output_entries(), entries_before);
}

#[tokio::test]
async fn test_published_file_is_never_partial() {
    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let storage = ws.storage().await;

    for i in 0..5 {
        let batch = ws.deliver(&format!("delta_{i}.csv"), &format!("I,{},P{i},C{i}\n", 10 + i));
        ws.coordinator().await.process_batch(&batch, false).await.unwrap();

        let bytes = storage.get(PUBLISHED).await.unwrap().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(HEADER));
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 2 + 2 + i);
    }
}

#[tokio::test]
async fn test_shutdown_before_publish_cancels_run() {
    use consolidator::core::consolidate::ConsolidationCoordinator;
    use tokio::sync::watch;

    let ws = Workspace::new();
    seed_snapshot(&ws).await;
    let before = ws.published().unwrap();

    let (tx, rx) = watch::channel(false);
    let coordinator =
        ConsolidationCoordinator::new(ws.config(), Arc::new(ws.storage().await), rx).unwrap();
    tx.send(true).unwrap();

    let batch = ws.deliver("delta_002.csv", "I,3,Cid,LA\n");
    let err = coordinator.process_batch(&batch, false).await.unwrap_err();

    assert!(matches!(err, ConsolidatorError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert_eq!(ws.published().unwrap(), before);
    assert!(ws.staging_dirs().is_empty());
}
