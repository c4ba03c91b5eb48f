use std::collections::HashMap;

use thiserror::Error;

use super::BoxFuture;
use crate::likes::LikeKind;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("cms configuration error: {0}")]
    Configuration(String),
    #[error("cms bad request: {0}")]
    BadRequest(String),
    #[error("cms unauthorized: {0}")]
    Unauthorized(String),
    #[error("cms forbidden: {0}")]
    Forbidden(String),
    #[error("cms not found: {0}")]
    NotFound(String),
    #[error("cms upstream error: {0}")]
    Upstream(String),
    #[error("cms transport error: {0}")]
    Transport(String),
    #[error("cms response decode error: {0}")]
    InvalidResponse(String),
}

/// One page of liked-entity rows read back from the CMS. `entity_ids`
/// carries one id per association row in the page; `filter_count` is the
/// total number of matching accounts, which drives pagination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssociationPage {
    pub entity_ids: Vec<String>,
    pub filter_count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterUpdate {
    pub alias: String,
    pub kind: LikeKind,
    pub entity_id: String,
    pub value: i64,
}

/// Per-alias results of a batched counter write. `None` marks a row the
/// CMS rejected; the batch as a whole still succeeded.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    pub results: HashMap<String, Option<i64>>,
}

pub trait LikeStorePort: Send + Sync {
    fn list_liked_associations(
        &self,
        kind: LikeKind,
        offset: i64,
        limit: i64,
    ) -> BoxFuture<'_, Result<AssociationPage, CmsError>>;
    fn create_association(
        &self,
        kind: LikeKind,
        account_id: &str,
        entity_id: &str,
    ) -> BoxFuture<'_, Result<(), CmsError>>;
    fn delete_association(
        &self,
        kind: LikeKind,
        account_id: &str,
        record_id: i64,
    ) -> BoxFuture<'_, Result<(), CmsError>>;
    fn batch_set_counters(
        &self,
        updates: &[CounterUpdate],
    ) -> BoxFuture<'_, Result<BatchOutcome, CmsError>>;
}
