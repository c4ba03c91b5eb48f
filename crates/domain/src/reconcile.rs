use std::sync::Arc;

use crate::counters::LikeCounters;
use crate::likes::LikeKind;
use crate::ports::cms::LikeStorePort;

const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub created: u64,
    pub total_likes: u64,
    pub pages: u64,
}

/// Rebuilds the in-memory counters from the CMS association records at
/// startup. Runs once per kind before the server starts accepting
/// requests.
pub struct Reconciler {
    counters: Arc<LikeCounters>,
    cms: Arc<dyn LikeStorePort>,
    page_size: i64,
}

impl Reconciler {
    pub fn new(counters: Arc<LikeCounters>, cms: Arc<dyn LikeStorePort>, page_size: i64) -> Self {
        let page_size = if page_size > 0 {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self {
            counters,
            cms,
            page_size,
        }
    }

    /// Best effort: a page failure logs and stops the loop early, it
    /// never aborts startup. Counts are cumulative across accounts, so
    /// an entity liked by N accounts restores to N.
    pub async fn restore(&self, kind: LikeKind) -> RestoreSummary {
        let store = self.counters.store(kind);
        let mut summary = RestoreSummary::default();
        let mut offset = 0i64;

        loop {
            let page = match self
                .cms
                .list_liked_associations(kind, offset, self.page_size)
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(
                        kind = kind.as_str(),
                        offset,
                        error = %err,
                        "like count restore stopped early"
                    );
                    break;
                }
            };
            summary.pages += 1;

            for entity_id in &page.entity_ids {
                if store.upsert(entity_id, 1).created() {
                    summary.created += 1;
                }
                summary.total_likes += 1;
            }

            offset += self.page_size;
            if offset >= page.filter_count {
                break;
            }
        }

        summary
    }
}
