use serde::{Deserialize, Serialize};

use super::BoxFuture;
use super::cms::CmsError;
use crate::likes::{LikeKind, LikedEntry};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccountProfile {
    pub id: String,
    pub mastodon_account: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub liked_events: Vec<LikedEntry>,
    pub liked_rooms: Vec<LikedEntry>,
}

impl AccountProfile {
    pub fn liked(&self, kind: LikeKind) -> &[LikedEntry] {
        match kind {
            LikeKind::Event => &self.liked_events,
            LikeKind::Room => &self.liked_rooms,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub mastodon_account: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub like_count: i64,
    pub view_count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub hubs_id: Option<String>,
    pub passcode: Option<String>,
    pub like_count: i64,
    pub view_count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Avatar {
    pub id: String,
    pub title: Option<String>,
    pub image: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Opened,
    Soon,
    Closed,
}

impl EventStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "opened" => Some(EventStatus::Opened),
            "soon" => Some(EventStatus::Soon),
            "closed" => Some(EventStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventQuery {
    pub offset: i64,
    pub limit: i64,
    pub locale: Option<String>,
    pub status: Vec<EventStatus>,
}

#[derive(Clone, Debug, Default)]
pub struct RoomQuery {
    pub offset: i64,
    pub limit: i64,
}

pub trait ContentPort: Send + Sync {
    fn find_account(
        &self,
        mastodon_account: &str,
    ) -> BoxFuture<'_, Result<Option<AccountProfile>, CmsError>>;
    fn create_account(
        &self,
        account: &NewAccount,
    ) -> BoxFuture<'_, Result<AccountProfile, CmsError>>;
    fn get_event(&self, event_id: &str) -> BoxFuture<'_, Result<Event, CmsError>>;
    fn list_events(&self, query: &EventQuery) -> BoxFuture<'_, Result<Vec<Event>, CmsError>>;
    fn get_room(&self, room_id: &str) -> BoxFuture<'_, Result<Room, CmsError>>;
    fn list_rooms(&self, query: &RoomQuery) -> BoxFuture<'_, Result<Vec<Room>, CmsError>>;
    fn list_rooms_owned(&self, account_id: &str) -> BoxFuture<'_, Result<Vec<Room>, CmsError>>;
    fn list_rooms_by_hubs_id(&self, hubs_id: &str) -> BoxFuture<'_, Result<Vec<Room>, CmsError>>;
    fn set_view_count(
        &self,
        kind: LikeKind,
        entity_id: &str,
        view_count: i64,
    ) -> BoxFuture<'_, Result<(), CmsError>>;
    fn list_avatars(&self) -> BoxFuture<'_, Result<Vec<Avatar>, CmsError>>;
    fn list_avatars_owned(&self, account_id: &str) -> BoxFuture<'_, Result<Vec<Avatar>, CmsError>>;
}
