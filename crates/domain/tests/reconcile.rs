use std::sync::{Arc, Mutex};

use hubs_domain::counters::LikeCounters;
use hubs_domain::likes::LikeKind;
use hubs_domain::ports::BoxFuture;
use hubs_domain::ports::cms::{
    AssociationPage, BatchOutcome, CmsError, CounterUpdate, LikeStorePort,
};
use hubs_domain::reconcile::Reconciler;

struct PagedCms {
    filter_count: i64,
    pages: Vec<Result<Vec<String>, ()>>,
    requested_offsets: Mutex<Vec<i64>>,
}

impl PagedCms {
    fn new(filter_count: i64, pages: Vec<Result<Vec<String>, ()>>) -> Self {
        Self {
            filter_count,
            pages,
            requested_offsets: Mutex::new(Vec::new()),
        }
    }

    fn offsets(&self) -> Vec<i64> {
        self.requested_offsets.lock().expect("offsets lock").clone()
    }
}

impl LikeStorePort for PagedCms {
    fn list_liked_associations(
        &self,
        _kind: LikeKind,
        offset: i64,
        limit: i64,
    ) -> BoxFuture<'_, Result<AssociationPage, CmsError>> {
        Box::pin(async move {
            let mut offsets = self.requested_offsets.lock().expect("offsets lock");
            let page_index = offsets.len();
            offsets.push(offset);
            drop(offsets);

            assert!(limit > 0);
            match self.pages.get(page_index) {
                Some(Ok(entity_ids)) => Ok(AssociationPage {
                    entity_ids: entity_ids.clone(),
                    filter_count: self.filter_count,
                }),
                Some(Err(())) => Err(CmsError::Upstream("status 502".to_string())),
                None => Ok(AssociationPage {
                    entity_ids: Vec::new(),
                    filter_count: self.filter_count,
                }),
            }
        })
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
        _updates: &[CounterUpdate],
    ) -> BoxFuture<'_, Result<BatchOutcome, CmsError>> {
        Box::pin(async { Ok(BatchOutcome::default()) })
    }
}

fn ids(values: &[&str]) -> Result<Vec<String>, ()> {
    Ok(values.iter().map(|value| value.to_string()).collect())
}

#[tokio::test]
async fn restore_tallies_cumulative_likes_per_entity() {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(PagedCms::new(3, vec![ids(&["ev-a", "ev-a", "ev-b"])]));
    let reconciler = Reconciler::new(counters.clone(), cms, 100);

    let summary = reconciler.restore(LikeKind::Event).await;

    assert_eq!(counters.store(LikeKind::Event).get("ev-a"), Some(2));
    assert_eq!(counters.store(LikeKind::Event).get("ev-b"), Some(1));
    assert_eq!(summary.created, 2);
    assert_eq!(summary.total_likes, 3);
    assert_eq!(summary.pages, 1);
}

#[tokio::test]
async fn pagination_stops_after_the_last_partial_page() {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(PagedCms::new(
        250,
        vec![ids(&["ev-1"]), ids(&["ev-2"]), ids(&["ev-3"])],
    ));
    let reconciler = Reconciler::new(counters, cms.clone(), 100);

    let summary = reconciler.restore(LikeKind::Event).await;

    assert_eq!(cms.offsets(), vec![0, 100, 200]);
    assert_eq!(summary.pages, 3);
}

#[tokio::test]
async fn page_error_stops_early_without_failing() {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(PagedCms::new(
        300,
        vec![ids(&["ev-1", "ev-2"]), Err(()), ids(&["ev-3"])],
    ));
    let reconciler = Reconciler::new(counters.clone(), cms.clone(), 100);

    let summary = reconciler.restore(LikeKind::Event).await;

    assert_eq!(cms.offsets(), vec![0, 100]);
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.total_likes, 2);
    assert_eq!(counters.store(LikeKind::Event).get("ev-3"), None);
}

#[tokio::test]
async fn empty_collection_reads_a_single_page() {
    let counters = Arc::new(LikeCounters::new());
    let cms = Arc::new(PagedCms::new(0, vec![ids(&[])]));
    let reconciler = Reconciler::new(counters.clone(), cms.clone(), 100);

    let summary = reconciler.restore(LikeKind::Room).await;

    assert_eq!(cms.offsets(), vec![0]);
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(summary.total_likes, 0);
    assert!(counters.store(LikeKind::Room).is_empty());
}
