use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hubs_domain::backup::{BackupService, FlushSummary};
use hubs_domain::counters::LikeCounters;
use hubs_domain::likes::LikeKind;
use hubs_domain::ports::BoxFuture;
use hubs_domain::ports::cms::{
    AssociationPage, BatchOutcome, CmsError, CounterUpdate, LikeStorePort,
};

enum BatchBehavior {
    Accept,
    RejectAliases(Vec<String>),
    Fail,
}

struct CapturingCms {
    behavior: BatchBehavior,
    batches: Mutex<Vec<Vec<CounterUpdate>>>,
}

impl CapturingCms {
    fn new(behavior: BatchBehavior) -> Self {
        Self {
            behavior,
            batches: Mutex::new(Vec::new()),
        }
    }

    fn batches(&self) -> Vec<Vec<CounterUpdate>> {
        self.batches.lock().expect("batches lock").clone()
    }
}

impl LikeStorePort for CapturingCms {
    fn list_liked_associations(
        &self,
        _kind: LikeKind,
        _offset: i64,
        _limit: i64,
    ) -> BoxFuture<'_, Result<AssociationPage, CmsError>> {
        Box::pin(async { Ok(AssociationPage::default()) })
    }

    fn create_association(
        &self,
        _kind: LikeKind,
        _account_id: &str,
        _entity_id: &str,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_association(
        &self,
        _kind: LikeKind,
        _account_id: &str,
        _record_id: i64,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        Box::pin(async { Ok(()) })
    }

    fn batch_set_counters(
        &self,
        updates: &[CounterUpdate],
    ) -> BoxFuture<'_, Result<BatchOutcome, CmsError>> {
        let updates = updates.to_vec();
        Box::pin(async move {
            self.batches
                .lock()
                .expect("batches lock")
                .push(updates.clone());
            match &self.behavior {
                BatchBehavior::Fail => Err(CmsError::Transport("connection reset".to_string())),
                BatchBehavior::Accept => Ok(outcome(&updates, &[])),
                BatchBehavior::RejectAliases(aliases) => Ok(outcome(&updates, aliases)),
            }
        })
    }
}

fn outcome(updates: &[CounterUpdate], rejected: &[String]) -> BatchOutcome {
    let mut results = HashMap::new();
    for update in updates {
        if rejected.contains(&update.alias) {
            results.insert(update.alias.clone(), None);
        } else {
            results.insert(update.alias.clone(), Some(update.value));
        }
    }
    BatchOutcome { results }
}

fn seeded_counters() -> Arc<LikeCounters> {
    let counters = Arc::new(LikeCounters::new());
    counters.store(LikeKind::Event).upsert("ev-a", 2);
    counters.store(LikeKind::Room).upsert("room-x", 5);
    counters.store(LikeKind::Room).upsert("room-y", 1);
    counters
}

#[tokio::test]
async fn flush_emits_overwrite_rows_with_one_alias_sequence() {
    let counters = seeded_counters();
    let cms = Arc::new(CapturingCms::new(BatchBehavior::Accept));
    let backup = BackupService::new(counters, cms.clone());

    let summary = backup.flush().await.expect("flush");

    let batches = cms.batches();
    assert_eq!(batches.len(), 1);
    let rows: Vec<(String, LikeKind, String, i64)> = batches[0]
        .iter()
        .map(|row| {
            (
                row.alias.clone(),
                row.kind,
                row.entity_id.clone(),
                row.value,
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("e0".to_string(), LikeKind::Event, "ev-a".to_string(), 2),
            ("r1".to_string(), LikeKind::Room, "room-x".to_string(), 5),
            ("r2".to_string(), LikeKind::Room, "room-y".to_string(), 1),
        ]
    );
    assert_eq!(summary.items, 3);
    assert_eq!(summary.likes, 8);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn rejected_rows_are_skipped_without_failing_the_cycle() {
    let counters = seeded_counters();
    let cms = Arc::new(CapturingCms::new(BatchBehavior::RejectAliases(vec![
        "r1".to_string(),
    ])));
    let backup = BackupService::new(counters, cms);

    let summary = backup.flush().await.expect("flush");

    assert_eq!(summary.items, 2);
    assert_eq!(summary.likes, 3);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn empty_counters_skip_the_cms_call() {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(CapturingCms::new(BatchBehavior::Accept));
    let backup = BackupService::new(counters, cms.clone());

    let summary = backup.flush().await.expect("flush");

    assert!(cms.batches().is_empty());
    assert_eq!(summary, FlushSummary::default());
}

#[tokio::test]
async fn batch_call_failure_surfaces_as_an_error() {
    let counters = seeded_counters();
    let cms = Arc::new(CapturingCms::new(BatchBehavior::Fail));
    let backup = BackupService::new(counters, cms);

    let result = backup.flush().await;

    assert!(matches!(result, Err(CmsError::Transport(_))));
}
