use std::sync::Arc;

use crate::counters::LikeCounters;
use crate::likes::LikeKind;
use crate::ports::cms::{CmsError, CounterUpdate, LikeStorePort};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub items: usize,
    pub likes: i64,
    pub failed: usize,
}

/// Flushes counter snapshots back to the CMS in one batched mutation.
/// Rows overwrite the stored value; they do not add to it.
pub struct BackupService {
    counters: Arc<LikeCounters>,
    cms: Arc<dyn LikeStorePort>,
}

impl BackupService {
    pub fn new(counters: Arc<LikeCounters>, cms: Arc<dyn LikeStorePort>) -> Self {
        Self { counters, cms }
    }

    /// A rejected row (null alias in the response) is counted as failed
    /// and skipped; only a failure of the batch call itself is an error.
    pub async fn flush(&self) -> Result<FlushSummary, CmsError> {
        let updates = self.collect_updates();
        if updates.is_empty() {
            return Ok(FlushSummary::default());
        }

        let outcome = self.cms.batch_set_counters(&updates).await?;

        let mut summary = FlushSummary::default();
        for update in &updates {
            match outcome.results.get(&update.alias) {
                Some(Some(value)) => {
                    summary.items += 1;
                    summary.likes += value;
                }
                _ => {
                    summary.failed += 1;
                    tracing::warn!(
                        alias = %update.alias,
                        kind = update.kind.as_str(),
                        entity_id = %update.entity_id,
                        "like count backup row rejected"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Aliases run a single index across both kinds (`e0, e1, r2, ...`)
    /// so every row in the batch stays unique.
    fn collect_updates(&self) -> Vec<CounterUpdate> {
        let mut updates = Vec::new();
        let mut index = 0usize;

        for kind in [LikeKind::Event, LikeKind::Room] {
            let snapshot = self.counters.store(kind).snapshot();
            let mut entries: Vec<(String, i64)> = snapshot.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            for (entity_id, value) in entries {
                updates.push(CounterUpdate {
                    alias: format!("{}{}", kind.alias_prefix(), index),
                    kind,
                    entity_id,
                    value,
                });
                index += 1;
            }
        }

        updates
    }
}
