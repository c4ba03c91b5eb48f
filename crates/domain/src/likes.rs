use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::counters::LikeCounters;
use crate::ports::cms::{CmsError, LikeStorePort};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LikeKind {
    Event,
    Room,
}

impl LikeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeKind::Event => "event",
            LikeKind::Room => "room",
        }
    }

    pub fn alias_prefix(self) -> &'static str {
        match self {
            LikeKind::Event => "e",
            LikeKind::Room => "r",
        }
    }
}

/// One row of an account's liked set. `record_id` identifies the
/// association record in the CMS, `entity_id` the liked event or room.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikedEntry {
    pub record_id: i64,
    pub entity_id: String,
}

#[derive(Clone)]
pub struct LikeService {
    counters: Arc<LikeCounters>,
    cms: Arc<dyn LikeStorePort>,
}

impl LikeService {
    pub fn new(counters: Arc<LikeCounters>, cms: Arc<dyn LikeStorePort>) -> Self {
        Self { counters, cms }
    }

    /// Applies a like or unlike for one account against one entity.
    ///
    /// The counter is always touched and mutated first; the CMS
    /// association write follows only when the request actually flips
    /// the account's state. A redundant request returns the current
    /// count without a delta or a CMS write. The counter is not rolled
    /// back if the CMS write fails.
    pub async fn toggle(
        &self,
        kind: LikeKind,
        account_id: &str,
        liked: &[LikedEntry],
        entity_id: &str,
        want_liked: bool,
    ) -> Result<i64, CmsError> {
        let already = liked.iter().find(|entry| entry.entity_id == entity_id);
        let store = self.counters.store(kind);

        let count = match (want_liked, already) {
            // Redundant like. A missing counter here means the restore
            // pass never saw this association, so seed it with 1.
            (true, Some(_)) => match store.get(entity_id) {
                Some(value) => value,
                None => store.upsert(entity_id, 1).value(),
            },
            (true, None) => store.upsert(entity_id, 1).value(),
            (false, Some(_)) => store.increment_by(entity_id, -1).unwrap_or(0),
            (false, None) => store.get(entity_id).unwrap_or(0),
        };

        match (want_liked, already) {
            (true, None) => {
                self.cms
                    .create_association(kind, account_id, entity_id)
                    .await?;
            }
            (false, Some(entry)) => {
                self.cms
                    .delete_association(kind, account_id, entry.record_id)
                    .await?;
            }
            _ => {}
        }

        Ok(count)
    }

    pub fn current_count(&self, kind: LikeKind, entity_id: &str) -> Option<i64> {
        self.counters.store(kind).get(entity_id)
    }
}
