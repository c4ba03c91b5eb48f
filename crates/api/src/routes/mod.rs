use axum::extract::{Extension, Path, Query, State};
use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hubs_domain::likes::LikeKind;
use hubs_domain::ports::content::{
    AccountProfile, Avatar, Event, EventQuery, EventStatus, Room, RoomQuery,
};

use crate::middleware::AuthContext;
use crate::observability;
use crate::{error::ApiError, middleware as app_middleware, state::AppState, validation};

const DEFAULT_LIST_LIMIT: i64 = 25;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/my-rooms", get(my_rooms))
        .route("/my-avatars", get(my_avatars))
        .route("/events/:event_id/liked", post(event_liked))
        .route("/events/:event_id/unliked", post(event_unliked))
        .route("/rooms/:room_id/liked", post(room_liked))
        .route("/rooms/:room_id/unliked", post(room_unliked))
        .route_layer(middleware::from_fn(app_middleware::require_auth_middleware));

    let hubs_cms = Router::new()
        .route("/events", get(list_events))
        .route("/events/:event_id", get(get_event))
        .route("/events/:event_id/viewed", post(event_viewed))
        .route("/rooms", get(list_rooms))
        .route("/rooms/:room_id", get(get_room))
        .route("/rooms/:room_id/viewed", post(room_viewed))
        .route("/passcode/:hubs_id", post(check_passcode))
        .route("/avatars", get(list_avatars))
        .merge(protected);

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version_info))
        .route("/metrics", get(metrics_endpoint))
        .nest("/api/hubs-cms/v1", hubs_cms)
        .layer(app_middleware::timeout_layer())
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(app_middleware::metrics_layer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_middleware,
        ));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer());
    }

    app.with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
    })
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
}

async fn version_info() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics_endpoint() -> String {
    observability::render_metrics().unwrap_or_default()
}

#[derive(Serialize)]
struct MeResponse {
    id: String,
    mastodon_account: String,
    display_name: Option<String>,
    avatar: Option<String>,
    liked_events: Vec<String>,
    liked_rooms: Vec<String>,
}

async fn me(Extension(auth): Extension<AuthContext>) -> Result<Json<MeResponse>, ApiError> {
    let account = account_from(&auth)?;
    Ok(Json(MeResponse {
        id: account.id.clone(),
        mastodon_account: account.mastodon_account.clone(),
        display_name: account.display_name.clone(),
        avatar: account.avatar.clone(),
        liked_events: account
            .liked_events
            .iter()
            .map(|entry| entry.entity_id.clone())
            .collect(),
        liked_rooms: account
            .liked_rooms
            .iter()
            .map(|entry| entry.entity_id.clone())
            .collect(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
struct EventListParams {
    #[validate(range(min = 0))]
    start: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    limit: Option<i64>,
    #[validate(length(min = 2, max = 16))]
    locale: Option<String>,
    status: Option<String>,
}

#[derive(Serialize)]
struct EventResponse {
    id: String,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    like_count: i64,
    view_count: i64,
    is_liked: bool,
}

#[derive(Serialize)]
struct RoomResponse {
    id: String,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    hubs_id: Option<String>,
    hubs_url: Option<String>,
    like_count: i64,
    view_count: i64,
    is_liked: bool,
}

#[derive(Serialize)]
struct AvatarResponse {
    id: String,
    title: Option<String>,
    image: Option<String>,
}

#[derive(Serialize)]
struct LikeCountResponse {
    like_count: i64,
}

#[derive(Serialize)]
struct ViewCountResponse {
    view_count: i64,
}

async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<EventListParams>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    validation::validate(&params)?;
    let query = EventQuery {
        offset: params.start.unwrap_or(0),
        limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        locale: params.locale.clone(),
        status: parse_status(params.status.as_deref())?,
    };
    let events = state.content.list_events(&query).await?;
    Ok(Json(
        events
            .into_iter()
            .map(|event| event_response(&state, &auth, event))
            .collect(),
    ))
}

async fn get_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state.content.get_event(&event_id).await?;
    Ok(Json(event_response(&state, &auth, event)))
}

async fn event_liked(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<String>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    toggle(state, auth, LikeKind::Event, event_id, true).await
}

async fn event_unliked(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<String>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    toggle(state, auth, LikeKind::Event, event_id, false).await
}

async fn event_viewed(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ViewCountResponse>, ApiError> {
    let event = state.content.get_event(&event_id).await?;
    let view_count = event.view_count + 1;
    state
        .content
        .set_view_count(LikeKind::Event, &event_id, view_count)
        .await?;
    Ok(Json(ViewCountResponse { view_count }))
}

#[derive(Debug, Deserialize, Validate)]
struct RoomListParams {
    #[validate(range(min = 0))]
    start: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    limit: Option<i64>,
}

async fn list_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<RoomListParams>,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    validation::validate(&params)?;
    let query = RoomQuery {
        offset: params.start.unwrap_or(0),
        limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
    };
    let rooms = state.content.list_rooms(&query).await?;
    Ok(Json(
        rooms
            .into_iter()
            .map(|room| room_response(&state, &auth, room))
            .collect(),
    ))
}

async fn get_room(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    let room = state.content.get_room(&room_id).await?;
    Ok(Json(room_response(&state, &auth, room)))
}

async fn my_rooms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<RoomResponse>>, ApiError> {
    let account = account_from(&auth)?;
    let rooms = state.content.list_rooms_owned(&account.id).await?;
    Ok(Json(
        rooms
            .into_iter()
            .map(|room| room_response(&state, &auth, room))
            .collect(),
    ))
}

async fn room_liked(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(room_id): Path<String>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    toggle(state, auth, LikeKind::Room, room_id, true).await
}

async fn room_unliked(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(room_id): Path<String>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    toggle(state, auth, LikeKind::Room, room_id, false).await
}

async fn room_viewed(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<ViewCountResponse>, ApiError> {
    let room = state.content.get_room(&room_id).await?;
    let view_count = room.view_count + 1;
    state
        .content
        .set_view_count(LikeKind::Room, &room_id, view_count)
        .await?;
    Ok(Json(ViewCountResponse { view_count }))
}

#[derive(Debug, Deserialize, Validate)]
struct PasscodeRequest {
    #[validate(length(min = 1))]
    passcode: String,
}

/// Gate check for joining a room by its hubs id. An unknown hubs id or a
/// room without a passcode both pass; only a mismatch is rejected.
async fn check_passcode(
    State(state): State<AppState>,
    Path(hubs_id): Path<String>,
    Json(request): Json<PasscodeRequest>,
) -> Result<(), ApiError> {
    validation::validate(&request)?;
    let rooms = state.content.list_rooms_by_hubs_id(&hubs_id).await?;

    if rooms.len() > 1 {
        let room_ids: Vec<&str> = rooms.iter().map(|room| room.id.as_str()).collect();
        tracing::error!(%hubs_id, rooms = ?room_ids, "duplicate hubs id across rooms");
        return Err(ApiError::Internal);
    }

    match rooms.first().and_then(|room| room.passcode.as_deref()) {
        Some(passcode) if !passcode.is_empty() && passcode != request.passcode => {
            Err(ApiError::Forbidden)
        }
        _ => Ok(()),
    }
}

async fn list_avatars(
    State(state): State<AppState>,
) -> Result<Json<Vec<AvatarResponse>>, ApiError> {
    let avatars = state.content.list_avatars().await?;
    Ok(Json(avatars.into_iter().map(avatar_response).collect()))
}

async fn my_avatars(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AvatarResponse>>, ApiError> {
    let account = account_from(&auth)?;
    let avatars = state.content.list_avatars_owned(&account.id).await?;
    Ok(Json(avatars.into_iter().map(avatar_response).collect()))
}

/// Shared like/unlike path. The entity is fetched first so a toggle on
/// an unknown id comes back 404 instead of minting a stray counter.
async fn toggle(
    state: AppState,
    auth: AuthContext,
    kind: LikeKind,
    entity_id: String,
    want_liked: bool,
) -> Result<Json<LikeCountResponse>, ApiError> {
    let account = account_from(&auth)?;
    match kind {
        LikeKind::Event => {
            state.content.get_event(&entity_id).await?;
        }
        LikeKind::Room => {
            state.content.get_room(&entity_id).await?;
        }
    }

    let like_count = state
        .likes
        .toggle(kind, &account.id, account.liked(kind), &entity_id, want_liked)
        .await?;
    observability::register_like_toggle(kind, if want_liked { "like" } else { "unlike" });
    Ok(Json(LikeCountResponse { like_count }))
}

fn account_from(auth: &AuthContext) -> Result<&AccountProfile, ApiError> {
    auth.account.as_ref().ok_or(ApiError::Unauthorized)
}

fn parse_status(raw: Option<&str>) -> Result<Vec<EventStatus>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            EventStatus::parse(part)
                .ok_or_else(|| ApiError::Validation(format!("unknown event status: {part}")))
        })
        .collect()
}

fn event_response(state: &AppState, auth: &AuthContext, event: Event) -> EventResponse {
    let like_count = state
        .likes
        .current_count(LikeKind::Event, &event.id)
        .unwrap_or(event.like_count);
    let is_liked = is_liked(auth, LikeKind::Event, &event.id);
    EventResponse {
        id: event.id,
        title: event.title,
        description: event.description,
        image: event.image,
        start_time: event.start_time,
        end_time: event.end_time,
        like_count,
        view_count: event.view_count,
        is_liked,
    }
}

fn room_response(state: &AppState, auth: &AuthContext, room: Room) -> RoomResponse {
    let like_count = state
        .likes
        .current_count(LikeKind::Room, &room.id)
        .unwrap_or(room.like_count);
    let is_liked = is_liked(auth, LikeKind::Room, &room.id);
    let hubs_url = hubs_room_url(&state.config.hubs_base_url, room.hubs_id.as_deref());
    RoomResponse {
        id: room.id,
        title: room.title,
        description: room.description,
        image: room.image,
        hubs_id: room.hubs_id,
        hubs_url,
        like_count,
        view_count: room.view_count,
        is_liked,
    }
}

fn hubs_room_url(base_url: &str, hubs_id: Option<&str>) -> Option<String> {
    hubs_id.map(|hubs_id| format!("{}/{}", base_url.trim_end_matches('/'), hubs_id))
}

fn avatar_response(avatar: Avatar) -> AvatarResponse {
    AvatarResponse {
        id: avatar.id,
        title: avatar.title,
        image: avatar.image,
    }
}

fn is_liked(auth: &AuthContext, kind: LikeKind, entity_id: &str) -> bool {
    auth.account
        .as_ref()
        .map(|account| {
            account
                .liked(kind)
                .iter()
                .any(|entry| entry.entity_id == entity_id)
        })
        .unwrap_or(false)
}
