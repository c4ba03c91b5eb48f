use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use hubs_domain::likes::{LikeKind, LikedEntry};
use hubs_domain::ports::BoxFuture;
use hubs_domain::ports::cms::{
    AssociationPage, BatchOutcome, CmsError, CounterUpdate, LikeStorePort,
};
use hubs_domain::ports::content::{
    AccountProfile, Avatar, ContentPort, Event, EventQuery, EventStatus, NewAccount, Room,
    RoomQuery,
};

use crate::config::AppConfig;

const AUTH_LOGIN_PATH: &str = "auth/login";
const GRAPHQL_PATH: &str = "graphql";
const ACCOUNT_ITEMS_PATH: &str = "items/account";
const TOKEN_EXPIRY_MARGIN_MS: i64 = 5_000;

const ACCOUNT_FIELDS: &str = "id,mastodon_account,display_name,avatar,\
liked_events.id,liked_events.event_id,liked_rooms.id,liked_rooms.room_id";
const EVENT_FIELDS: &str = "id,title,description,image,start_time,end_time,like_count,view_count";
const ROOM_FIELDS: &str =
    "id,title,description,image,hubs_id,passcode,like_count,view_count";
const AVATAR_FIELDS: &str = "id,title,image";

#[derive(Debug, Clone)]
struct CachedToken {
    bearer: String,
    expires_at: Instant,
}

/// Admin client for the Directus REST and GraphQL APIs. Holds a cached
/// admin access token; every REST call goes through a single retry on
/// 401 that forces a token refresh.
pub struct DirectusClient {
    http: reqwest::Client,
    base_url: String,
    admin_email: String,
    admin_password: String,
    token: Mutex<Option<CachedToken>>,
}

impl DirectusClient {
    pub fn from_config(config: &AppConfig) -> Self {
        let timeout = Duration::from_millis(config.directus_timeout_ms.max(1));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.directus_base_url.trim_end_matches('/').to_string(),
            admin_email: config.directus_admin_email.clone(),
            admin_password: config.directus_admin_password.clone(),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self, force_refresh: bool) -> Result<String, CmsError> {
        let mut slot = self.token.lock().await;
        if !force_refresh {
            if let Some(cached) = slot.as_ref() {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.bearer.clone());
                }
            }
        }

        let url = endpoint_url(&self.base_url, AUTH_LOGIN_PATH);
        let response = self
            .http
            .post(url.as_str())
            .json(&json!({
                "email": self.admin_email,
                "password": self.admin_password,
            }))
            .send()
            .await
            .map_err(|err| CmsError::Transport(err.to_string()))?;
        let body: LoginEnvelope = decode(response).await?;

        let bearer = format!("Bearer {}", body.data.access_token);
        let ttl_ms = body
            .data
            .expires
            .saturating_sub(TOKEN_EXPIRY_MARGIN_MS)
            .max(1_000) as u64;
        *slot = Some(CachedToken {
            bearer: bearer.clone(),
            expires_at: Instant::now() + Duration::from_millis(ttl_ms),
        });
        Ok(bearer)
    }

    /// Sends a request built by `build`, refreshing the admin token and
    /// retrying exactly once if the first attempt comes back 401.
    async fn send_authorized<F>(&self, build: F) -> Result<reqwest::Response, CmsError>
    where
        F: Fn(&reqwest::Client, &str) -> reqwest::RequestBuilder,
    {
        let token = self.access_token(false).await?;
        let response = build(&self.http, &token)
            .send()
            .await
            .map_err(|err| CmsError::Transport(err.to_string()))?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let token = self.access_token(true).await?;
        build(&self.http, &token)
            .send()
            .await
            .map_err(|err| CmsError::Transport(err.to_string()))
    }

    async fn fetch_account(
        &self,
        mastodon_account: &str,
    ) -> Result<Option<AccountProfile>, CmsError> {
        let url = endpoint_url(&self.base_url, ACCOUNT_ITEMS_PATH);
        let params = vec![
            ("fields".to_string(), ACCOUNT_FIELDS.to_string()),
            (
                "filter[mastodon_account][_eq]".to_string(),
                mastodon_account.to_string(),
            ),
            ("limit".to_string(), "1".to_string()),
        ];
        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ListEnvelope<AccountRow> = decode(response).await?;
        Ok(envelope.data.into_iter().next().map(AccountRow::into_profile))
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<AccountProfile, CmsError> {
        let url = endpoint_url(&self.base_url, ACCOUNT_ITEMS_PATH);
        let body = json!({
            "mastodon_account": account.mastodon_account,
            "display_name": account.display_name,
            "avatar": account.avatar,
        });
        let response = self
            .send_authorized(|http, token| {
                http.post(url.as_str())
                    .header(AUTHORIZATION, token)
                    .json(&body)
            })
            .await?;
        let envelope: ItemEnvelope<AccountRow> = decode(response).await?;
        Ok(envelope.data.into_profile())
    }

    async fn fetch_event(&self, event_id: &str) -> Result<Event, CmsError> {
        let url = endpoint_url(&self.base_url, &format!("items/event/{event_id}"));
        let params = vec![("fields".to_string(), EVENT_FIELDS.to_string())];
        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ItemEnvelope<EventRow> = decode(response).await?;
        Ok(envelope.data.into_event())
    }

    async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<Event>, CmsError> {
        let url = endpoint_url(&self.base_url, "items/event");
        let mut params = vec![
            ("fields".to_string(), event_list_fields(query)),
            ("offset".to_string(), query.offset.to_string()),
            ("limit".to_string(), query.limit.to_string()),
            ("sort".to_string(), "-start_time".to_string()),
        ];
        if let Some(locale) = &query.locale {
            params.push((
                "deep[translations][_filter][languages_code][_eq]".to_string(),
                locale.clone(),
            ));
        }
        params.extend(event_status_params(&query.status));

        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ListEnvelope<EventRow> = decode(response).await?;
        Ok(envelope.data.into_iter().map(EventRow::into_event).collect())
    }

    async fn fetch_room(&self, room_id: &str) -> Result<Room, CmsError> {
        let url = endpoint_url(&self.base_url, &format!("items/room/{room_id}"));
        let params = vec![("fields".to_string(), ROOM_FIELDS.to_string())];
        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ItemEnvelope<RoomRow> = decode(response).await?;
        Ok(envelope.data.into_room())
    }

    async fn fetch_rooms(&self, params: Vec<(String, String)>) -> Result<Vec<Room>, CmsError> {
        let url = endpoint_url(&self.base_url, "items/room");
        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ListEnvelope<RoomRow> = decode(response).await?;
        Ok(envelope.data.into_iter().map(RoomRow::into_room).collect())
    }

    async fn patch_view_count(
        &self,
        kind: LikeKind,
        entity_id: &str,
        view_count: i64,
    ) -> Result<(), CmsError> {
        let url = endpoint_url(
            &self.base_url,
            &format!("items/{}/{entity_id}", kind.as_str()),
        );
        let body = json!({ "view_count": view_count });
        let response = self
            .send_authorized(|http, token| {
                http.patch(url.as_str())
                    .header(AUTHORIZATION, token)
                    .json(&body)
            })
            .await?;
        decode::<Value>(response).await?;
        Ok(())
    }

    async fn fetch_avatars(&self, owner: Option<&str>) -> Result<Vec<Avatar>, CmsError> {
        let url = endpoint_url(&self.base_url, "items/avatar");
        let mut params = vec![("fields".to_string(), AVATAR_FIELDS.to_string())];
        if let Some(owner) = owner {
            params.push(("filter[owner][_eq]".to_string(), owner.to_string()));
        }
        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ListEnvelope<AvatarRow> = decode(response).await?;
        Ok(envelope
            .data
            .into_iter()
            .map(|row| Avatar {
                id: row.id,
                title: row.title,
                image: row.image,
            })
            .collect())
    }

    async fn fetch_liked_page(
        &self,
        kind: LikeKind,
        offset: i64,
        limit: i64,
    ) -> Result<AssociationPage, CmsError> {
        let url = endpoint_url(&self.base_url, ACCOUNT_ITEMS_PATH);
        let params = liked_page_params(kind, offset, limit);
        let response = self
            .send_authorized(|http, token| {
                http.get(url.as_str())
                    .header(AUTHORIZATION, token)
                    .query(&params)
            })
            .await?;
        let envelope: ListEnvelope<LikedPageRow> = decode(response).await?;

        let filter_count = envelope
            .meta
            .map(|meta| meta.filter_count)
            .unwrap_or_default();
        let mut entity_ids = Vec::new();
        for row in envelope.data {
            let refs = row
                .liked_events
                .into_iter()
                .flatten()
                .chain(row.liked_rooms.into_iter().flatten());
            for liked in refs {
                if let Some(entity_id) = liked.event_id.or(liked.room_id) {
                    entity_ids.push(entity_id);
                }
            }
        }
        Ok(AssociationPage {
            entity_ids,
            filter_count,
        })
    }

    async fn push_association(
        &self,
        kind: LikeKind,
        account_id: &str,
        entity_id: &str,
    ) -> Result<(), CmsError> {
        let relation = match kind {
            LikeKind::Event => json!({
                "create": [{ "account_id": account_id, "event_id": entity_id }],
                "update": [],
                "delete": [],
            }),
            LikeKind::Room => json!({
                "create": [{ "account_id": account_id, "room_id": entity_id }],
                "update": [],
                "delete": [],
            }),
        };
        self.patch_account_liked(kind, account_id, relation).await
    }

    async fn remove_association(
        &self,
        kind: LikeKind,
        account_id: &str,
        record_id: i64,
    ) -> Result<(), CmsError> {
        let relation = json!({
            "create": [],
            "update": [],
            "delete": [record_id],
        });
        self.patch_account_liked(kind, account_id, relation).await
    }

    async fn patch_account_liked(
        &self,
        kind: LikeKind,
        account_id: &str,
        relation: Value,
    ) -> Result<(), CmsError> {
        let url = endpoint_url(
            &self.base_url,
            &format!("{ACCOUNT_ITEMS_PATH}/{account_id}"),
        );
        let mut body = serde_json::Map::new();
        body.insert(liked_field(kind).to_string(), relation);
        let body = Value::Object(body);

        let response = self
            .send_authorized(|http, token| {
                http.patch(url.as_str())
                    .header(AUTHORIZATION, token)
                    .json(&body)
            })
            .await?;
        decode::<Value>(response).await?;
        Ok(())
    }

    /// Batch writes always log in fresh instead of reading the token
    /// cache. Per-row failures come back as null aliases, not errors.
    async fn run_counter_mutation(
        &self,
        updates: &[CounterUpdate],
    ) -> Result<BatchOutcome, CmsError> {
        let token = self.access_token(true).await?;
        let url = endpoint_url(&self.base_url, GRAPHQL_PATH);
        let mutation = render_counter_mutation(updates);
        let response = self
            .http
            .post(url.as_str())
            .header(AUTHORIZATION, token)
            .json(&json!({ "query": mutation }))
            .send()
            .await
            .map_err(|err| CmsError::Transport(err.to_string()))?;
        let body: Value = decode(response).await?;
        Ok(parse_batch_outcome(&body, updates))
    }
}

impl LikeStorePort for DirectusClient {
    fn list_liked_associations(
        &self,
        kind: LikeKind,
        offset: i64,
        limit: i64,
    ) -> BoxFuture<'_, Result<AssociationPage, CmsError>> {
        Box::pin(async move { self.fetch_liked_page(kind, offset, limit).await })
    }

    fn create_association(
        &self,
        kind: LikeKind,
        account_id: &str,
        entity_id: &str,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        let account_id = account_id.to_string();
        let entity_id = entity_id.to_string();
        Box::pin(async move { self.push_association(kind, &account_id, &entity_id).await })
    }

    fn delete_association(
        &self,
        kind: LikeKind,
        account_id: &str,
        record_id: i64,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        let account_id = account_id.to_string();
        Box::pin(async move { self.remove_association(kind, &account_id, record_id).await })
    }

    fn batch_set_counters(
        &self,
        updates: &[CounterUpdate],
    ) -> BoxFuture<'_, Result<BatchOutcome, CmsError>> {
        let updates = updates.to_vec();
        Box::pin(async move { self.run_counter_mutation(&updates).await })
    }
}

impl ContentPort for DirectusClient {
    fn find_account(
        &self,
        mastodon_account: &str,
    ) -> BoxFuture<'_, Result<Option<AccountProfile>, CmsError>> {
        let mastodon_account = mastodon_account.to_string();
        Box::pin(async move { self.fetch_account(&mastodon_account).await })
    }

    fn create_account(
        &self,
        account: &NewAccount,
    ) -> BoxFuture<'_, Result<AccountProfile, CmsError>> {
        let account = account.clone();
        Box::pin(async move { self.insert_account(&account).await })
    }

    fn get_event(&self, event_id: &str) -> BoxFuture<'_, Result<Event, CmsError>> {
        let event_id = event_id.to_string();
        Box::pin(async move { self.fetch_event(&event_id).await })
    }

    fn list_events(&self, query: &EventQuery) -> BoxFuture<'_, Result<Vec<Event>, CmsError>> {
        let query = query.clone();
        Box::pin(async move { self.fetch_events(&query).await })
    }

    fn get_room(&self, room_id: &str) -> BoxFuture<'_, Result<Room, CmsError>> {
        let room_id = room_id.to_string();
        Box::pin(async move { self.fetch_room(&room_id).await })
    }

    fn list_rooms(&self, query: &RoomQuery) -> BoxFuture<'_, Result<Vec<Room>, CmsError>> {
        let params = vec![
            ("fields".to_string(), ROOM_FIELDS.to_string()),
            ("offset".to_string(), query.offset.to_string()),
            ("limit".to_string(), query.limit.to_string()),
        ];
        Box::pin(async move { self.fetch_rooms(params).await })
    }

    fn list_rooms_owned(&self, account_id: &str) -> BoxFuture<'_, Result<Vec<Room>, CmsError>> {
        let params = vec![
            ("fields".to_string(), ROOM_FIELDS.to_string()),
            ("filter[owner][_eq]".to_string(), account_id.to_string()),
        ];
        Box::pin(async move { self.fetch_rooms(params).await })
    }

    fn list_rooms_by_hubs_id(&self, hubs_id: &str) -> BoxFuture<'_, Result<Vec<Room>, CmsError>> {
        let params = vec![
            ("fields".to_string(), ROOM_FIELDS.to_string()),
            ("filter[hubs_id][_eq]".to_string(), hubs_id.to_string()),
        ];
        Box::pin(async move { self.fetch_rooms(params).await })
    }

    fn set_view_count(
        &self,
        kind: LikeKind,
        entity_id: &str,
        view_count: i64,
    ) -> BoxFuture<'_, Result<(), CmsError>> {
        let entity_id = entity_id.to_string();
        Box::pin(async move { self.patch_view_count(kind, &entity_id, view_count).await })
    }

    fn list_avatars(&self) -> BoxFuture<'_, Result<Vec<Avatar>, CmsError>> {
        Box::pin(async move { self.fetch_avatars(None).await })
    }

    fn list_avatars_owned(&self, account_id: &str) -> BoxFuture<'_, Result<Vec<Avatar>, CmsError>> {
        let account_id = account_id.to_string();
        Box::pin(async move { self.fetch_avatars(Some(&account_id)).await })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CmsError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|err| CmsError::InvalidResponse(err.to_string()));
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::BAD_REQUEST => CmsError::BadRequest(message),
        StatusCode::UNAUTHORIZED => CmsError::Unauthorized(message),
        StatusCode::FORBIDDEN => CmsError::Forbidden(message),
        StatusCode::NOT_FOUND => CmsError::NotFound(message),
        status => CmsError::Upstream(format!("status {}: {}", status.as_u16(), message)),
    })
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn liked_field(kind: LikeKind) -> &'static str {
    match kind {
        LikeKind::Event => "liked_events",
        LikeKind::Room => "liked_rooms",
    }
}

fn entity_key(kind: LikeKind) -> &'static str {
    match kind {
        LikeKind::Event => "event_id",
        LikeKind::Room => "room_id",
    }
}

fn liked_page_params(kind: LikeKind, offset: i64, limit: i64) -> Vec<(String, String)> {
    let field = liked_field(kind);
    let key = entity_key(kind);
    vec![
        ("fields".to_string(), format!("{field}.{key}")),
        (format!("filter[{field}][{key}][_nnull]"), "true".to_string()),
        ("meta".to_string(), "filter_count".to_string()),
        ("offset".to_string(), offset.to_string()),
        ("limit".to_string(), limit.to_string()),
    ]
}

fn event_list_fields(query: &EventQuery) -> String {
    if query.locale.is_some() {
        format!("{EVENT_FIELDS},translations.title,translations.description")
    } else {
        EVENT_FIELDS.to_string()
    }
}

fn event_status_params(status: &[EventStatus]) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for (group, status) in status.iter().enumerate() {
        match status {
            EventStatus::Opened => {
                params.push((
                    format!("filter[_or][{group}][_and][0][start_time][_lte]"),
                    "$NOW".to_string(),
                ));
                params.push((
                    format!("filter[_or][{group}][_and][1][end_time][_gte]"),
                    "$NOW".to_string(),
                ));
            }
            EventStatus::Soon => {
                params.push((
                    format!("filter[_or][{group}][start_time][_gt]"),
                    "$NOW".to_string(),
                ));
            }
            EventStatus::Closed => {
                params.push((
                    format!("filter[_or][{group}][end_time][_lt]"),
                    "$NOW".to_string(),
                ));
            }
        }
    }
    params
}

fn render_counter_mutation(updates: &[CounterUpdate]) -> String {
    let mut mutation = String::from("mutation {");
    for (index, update) in updates.iter().enumerate() {
        if index > 0 {
            mutation.push(' ');
        }
        mutation.push_str(&format!(
            "{}: update_{}_item(id: \"{}\", data: {{ like_count: {} }}) {{like_count}}",
            update.alias,
            update.kind.as_str(),
            update.entity_id,
            update.value
        ));
    }
    mutation.push('}');
    mutation
}

fn parse_batch_outcome(body: &Value, updates: &[CounterUpdate]) -> BatchOutcome {
    let data = body.get("data");
    let mut results = HashMap::new();
    for update in updates {
        let value = data
            .and_then(|rows| rows.get(&update.alias))
            .and_then(|row| row.get("like_count"))
            .and_then(Value::as_i64);
        results.insert(update.alias.clone(), value);
    }
    BatchOutcome { results }
}

#[derive(Debug, Deserialize)]
struct LoginEnvelope {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: String,
    #[serde(default)]
    expires: i64,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
    #[serde(default)]
    meta: Option<ListMeta>,
}

#[derive(Debug, Deserialize)]
struct ListMeta {
    filter_count: i64,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct AccountRow {
    id: String,
    mastodon_account: String,
    display_name: Option<String>,
    avatar: Option<String>,
    #[serde(default)]
    liked_events: Option<Vec<LikedEventRow>>,
    #[serde(default)]
    liked_rooms: Option<Vec<LikedRoomRow>>,
}

impl AccountRow {
    fn into_profile(self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            mastodon_account: self.mastodon_account,
            display_name: self.display_name,
            avatar: self.avatar,
            liked_events: self
                .liked_events
                .unwrap_or_default()
                .into_iter()
                .filter_map(|row| {
                    row.event_id.map(|entity_id| LikedEntry {
                        record_id: row.id,
                        entity_id,
                    })
                })
                .collect(),
            liked_rooms: self
                .liked_rooms
                .unwrap_or_default()
                .into_iter()
                .filter_map(|row| {
                    row.room_id.map(|entity_id| LikedEntry {
                        record_id: row.id,
                        entity_id,
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LikedEventRow {
    id: i64,
    event_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LikedRoomRow {
    id: i64,
    room_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LikedPageRow {
    #[serde(default)]
    liked_events: Option<Vec<LikedRef>>,
    #[serde(default)]
    liked_rooms: Option<Vec<LikedRef>>,
}

#[derive(Debug, Default, Deserialize)]
struct LikedRef {
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    view_count: i64,
    #[serde(default)]
    translations: Option<Vec<EventTranslationRow>>,
}

impl EventRow {
    fn into_event(self) -> Event {
        let translation = self
            .translations
            .unwrap_or_default()
            .into_iter()
            .next();
        let (title, description) = match translation {
            Some(row) => (
                row.title.or(self.title),
                row.description.or(self.description),
            ),
            None => (self.title, self.description),
        };
        Event {
            id: self.id,
            title,
            description,
            image: self.image,
            start_time: self.start_time,
            end_time: self.end_time,
            like_count: self.like_count,
            view_count: self.view_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventTranslationRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoomRow {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    hubs_id: Option<String>,
    #[serde(default)]
    passcode: Option<String>,
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    view_count: i64,
}

impl RoomRow {
    fn into_room(self) -> Room {
        Room {
            id: self.id,
            title: self.title,
            description: self.description,
            image: self.image,
            hubs_id: self.hubs_id,
            passcode: self.passcode,
            like_count: self.like_count,
            view_count: self.view_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvatarRow {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(alias: &str, kind: LikeKind, entity_id: &str, value: i64) -> CounterUpdate {
        CounterUpdate {
            alias: alias.to_string(),
            kind,
            entity_id: entity_id.to_string(),
            value,
        }
    }

    #[test]
    fn counter_mutation_renders_aliased_rows() {
        let updates = vec![
            update("e0", LikeKind::Event, "ev-1", 4),
            update("r1", LikeKind::Room, "room-1", 2),
        ];
        assert_eq!(
            render_counter_mutation(&updates),
            "mutation {e0: update_event_item(id: \"ev-1\", data: { like_count: 4 }) {like_count} \
r1: update_room_item(id: \"room-1\", data: { like_count: 2 }) {like_count}}"
        );
    }

    #[test]
    fn batch_outcome_marks_null_rows_as_rejected() {
        let updates = vec![
            update("e0", LikeKind::Event, "ev-1", 4),
            update("e1", LikeKind::Event, "ev-2", 7),
        ];
        let body = serde_json::json!({
            "data": {
                "e0": { "like_count": 4 },
                "e1": null,
            }
        });
        let outcome = parse_batch_outcome(&body, &updates);
        assert_eq!(outcome.results.get("e0"), Some(&Some(4)));
        assert_eq!(outcome.results.get("e1"), Some(&None));
    }

    #[test]
    fn liked_page_params_follow_the_junction_fields() {
        let params = liked_page_params(LikeKind::Room, 200, 100);
        assert!(params.contains(&(
            "fields".to_string(),
            "liked_rooms.room_id".to_string()
        )));
        assert!(params.contains(&(
            "filter[liked_rooms][room_id][_nnull]".to_string(),
            "true".to_string()
        )));
        assert!(params.contains(&("offset".to_string(), "200".to_string())));
    }

    #[test]
    fn opened_status_filters_on_both_bounds() {
        let params = event_status_params(&[EventStatus::Opened, EventStatus::Closed]);
        assert_eq!(
            params,
            vec![
                (
                    "filter[_or][0][_and][0][start_time][_lte]".to_string(),
                    "$NOW".to_string()
                ),
                (
                    "filter[_or][0][_and][1][end_time][_gte]".to_string(),
                    "$NOW".to_string()
                ),
                (
                    "filter[_or][1][end_time][_lt]".to_string(),
                    "$NOW".to_string()
                ),
            ]
        );
    }

    #[test]
    fn endpoint_url_normalizes_slashes() {
        assert_eq!(
            endpoint_url("http://cms:8055/", "/items/event"),
            "http://cms:8055/items/event"
        );
    }
}
