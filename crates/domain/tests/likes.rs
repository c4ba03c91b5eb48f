use std::sync::{Arc, Mutex};

use hubs_domain::counters::LikeCounters;
use hubs_domain::likes::{LikeKind, LikeService, LikedEntry};
use hubs_domain::ports::BoxFuture;
use hubs_domain::ports::cms::{
    AssociationPage, BatchOutcome, CmsError, CounterUpdate, LikeStorePort,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum RecordedWrite {
    Create {
        kind: LikeKind,
        account_id: String,
        entity_id: String,
    },
    Delete {
        kind: LikeKind,
        record_id: i64,
    },
}

#[derive(Default)]
struct RecordingCms {
    writes: Mutex<Vec<RecordedWrite>>,
    fail_writes: bool,
}

impl RecordingCms {
    fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().expect("writes lock").clone()
    }
}

impl LikeStorePort for RecordingCms {
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
        kind: LikeKind,
        account_id: &str,
        entity_id: &str,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        let account_id = account_id.to_string();
        let entity_id = entity_id.to_string();
        Box::pin(async move {
            if self.fail_writes {
                return Err(CmsError::Upstream("status 503".to_string()));
            }
            self.writes
                .lock()
                .expect("writes lock")
                .push(RecordedWrite::Create {
                    kind,
                    account_id,
                    entity_id,
                });
            Ok(())
        })
    }

    fn delete_association(
        &self,
        kind: LikeKind,
        _account_id: &str,
        record_id: i64,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        Box::pin(async move {
            if self.fail_writes {
                return Err(CmsError::Upstream("status 503".to_string()));
            }
            self.writes
                .lock()
                .expect("writes lock")
                .push(RecordedWrite::Delete { kind, record_id });
            Ok(())
        })
    }

    fn batch_set_counters(
        &self,
        _updates: &[CounterUpdate],
    ) -> BoxFuture<'_, Result<BatchOutcome, CmsError>> {
        Box::pin(async { Ok(BatchOutcome::default()) })
    }
}

fn service() -> (Arc<LikeCounters>, Arc<RecordingCms>, LikeService) {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(RecordingCms::default());
    let service = LikeService::new(counters.clone(), cms.clone());
    (counters, cms, service)
}

fn liked(record_id: i64, entity_id: &str) -> Vec<LikedEntry> {
    vec![LikedEntry {
        record_id,
        entity_id: entity_id.to_string(),
    }]
}

#[tokio::test]
async fn first_like_seeds_counter_and_writes_association() {
    let (_, cms, service) = service();

    let count = service
        .toggle(LikeKind::Event, "acc-1", &[], "ev-1", true)
        .await
        .expect("toggle");

    assert_eq!(count, 1);
    assert_eq!(
        cms.writes(),
        vec![RecordedWrite::Create {
            kind: LikeKind::Event,
            account_id: "acc-1".to_string(),
            entity_id: "ev-1".to_string(),
        }]
    );
}

#[tokio::test]
async fn redundant_like_applies_no_delta_and_no_write() {
    let (_, cms, service) = service();

    service
        .toggle(LikeKind::Event, "acc-1", &[], "ev-1", true)
        .await
        .expect("first like");
    let entries = liked(7, "ev-1");
    let count = service
        .toggle(LikeKind::Event, "acc-1", &entries, "ev-1", true)
        .await
        .expect("second like");

    assert_eq!(count, 1);
    assert_eq!(cms.writes().len(), 1);
}

#[tokio::test]
async fn redundant_like_self_heals_a_missing_counter() {
    let (counters, cms, service) = service();
    let entries = liked(7, "ev-1");

    let count = service
        .toggle(LikeKind::Event, "acc-1", &entries, "ev-1", true)
        .await
        .expect("toggle");

    assert_eq!(count, 1);
    assert_eq!(counters.store(LikeKind::Event).get("ev-1"), Some(1));
    assert!(cms.writes().is_empty());
}

#[tokio::test]
async fn like_then_unlike_is_symmetric() {
    let (counters, cms, service) = service();

    service
        .toggle(LikeKind::Room, "acc-1", &[], "room-1", true)
        .await
        .expect("like");
    let entries = liked(42, "room-1");
    let count = service
        .toggle(LikeKind::Room, "acc-1", &entries, "room-1", false)
        .await
        .expect("unlike");

    assert_eq!(count, 0);
    assert_eq!(counters.store(LikeKind::Room).get("room-1"), Some(0));
    assert_eq!(
        cms.writes()[1],
        RecordedWrite::Delete {
            kind: LikeKind::Room,
            record_id: 42,
        }
    );
}

#[tokio::test]
async fn redundant_unlike_reads_without_mutating() {
    let (counters, cms, service) = service();
    counters.store(LikeKind::Event).upsert("ev-1", 3);

    let count = service
        .toggle(LikeKind::Event, "acc-1", &[], "ev-1", false)
        .await
        .expect("toggle");

    assert_eq!(count, 3);
    assert_eq!(counters.store(LikeKind::Event).get("ev-1"), Some(3));
    assert!(cms.writes().is_empty());
}

#[tokio::test]
async fn unlike_of_drifted_counter_goes_negative() {
    let (counters, _, service) = service();
    counters.store(LikeKind::Event).upsert("ev-1", 0);
    let entries = liked(9, "ev-1");

    let count = service
        .toggle(LikeKind::Event, "acc-1", &entries, "ev-1", false)
        .await
        .expect("toggle");

    assert_eq!(count, -1);
}

#[tokio::test]
async fn counter_moves_even_when_association_write_fails() {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(RecordingCms::failing());
    let service = LikeService::new(counters.clone(), cms);

    let result = service
        .toggle(LikeKind::Event, "acc-1", &[], "ev-1", true)
        .await;

    assert!(matches!(result, Err(CmsError::Upstream(_))));
    assert_eq!(counters.store(LikeKind::Event).get("ev-1"), Some(1));
}

#[tokio::test]
async fn concurrent_first_likes_lose_no_updates() {
    let (counters, _, service) = service();
    let tasks = 32usize;

    let mut handles = Vec::with_capacity(tasks);
    for n in 0..tasks {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .toggle(LikeKind::Event, &format!("acc-{n}"), &[], "cold-ev", true)
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("toggle");
    }

    assert_eq!(
        counters.store(LikeKind::Event).get("cold-ev"),
        Some(tasks as i64)
    );
}
