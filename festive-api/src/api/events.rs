//! Event endpoints: CRUD plus analytics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use festive_common::services::ModeSummary;
use festive_common::{Event, EventDraft};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Look-back window for `/events/analytics/recent` when none is given
pub const DEFAULT_RECENT_DAYS: u32 = 15;

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

fn required(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing query parameter: {}", name)))
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    Json(draft): Json<EventDraft>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = state.events.create(draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.events.list().await?))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.events.get(&id).await?))
}

/// PUT /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.events.update(&id, draft).await?))
}

/// DELETE /events/:id
///
/// Responds with the record as it was before deletion.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.events.delete(&id).await?))
}

/// GET /events/analytics/count
pub async fn count_events(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    let count = state.events.count().await?;
    Ok(Json(CountResponse { count }))
}

/// GET /events/analytics/this-month
pub async fn events_this_month(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(state.events.events_in_current_month().await?))
}

/// GET /events/analytics/top-city
pub async fn top_city(State(state): State<AppState>) -> ApiResult<Json<ModeSummary>> {
    Ok(Json(state.events.city_with_most_events().await?))
}

/// GET /events/analytics/top-performer
pub async fn top_performer(State(state): State<AppState>) -> ApiResult<Json<ModeSummary>> {
    Ok(Json(state.events.top_performer().await?))
}

/// GET /events/analytics/most-recent
///
/// `null` body when the catalog is empty.
pub async fn most_recent(State(state): State<AppState>) -> ApiResult<Json<Option<Event>>> {
    Ok(Json(state.events.most_recently_added().await?))
}

/// GET /events/analytics/recent?days=N
pub async fn recent_events(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let days = query.days.unwrap_or(DEFAULT_RECENT_DAYS);
    Ok(Json(state.events.created_within(days).await?))
}

/// GET /events/analytics/top-past-location
pub async fn top_past_location(State(state): State<AppState>) -> ApiResult<Json<ModeSummary>> {
    Ok(Json(state.events.top_past_location().await?))
}

/// GET /events/analytics/by-location?location=
pub async fn events_by_location(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let location = required(query.location, "location")?;
    Ok(Json(state.events.events_at_location(&location).await?))
}

/// GET /events/analytics/by-month?month=
pub async fn events_by_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let month = required(query.month, "month")?;
    Ok(Json(state.events.events_in_month(&month).await?))
}

/// GET /events/analytics/by-title?title=
pub async fn event_by_title(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> ApiResult<Json<Event>> {
    let title = required(query.title, "title")?;
    state
        .events
        .find_by_title(&title)
        .await?
        .map(Json)
        .ok_or_else(|| festive_common::Error::NotFound(format!("No event titled {}", title)).into())
}

/// Build event routes
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/analytics/count", get(count_events))
        .route("/events/analytics/this-month", get(events_this_month))
        .route("/events/analytics/top-city", get(top_city))
        .route("/events/analytics/top-performer", get(top_performer))
        .route("/events/analytics/most-recent", get(most_recent))
        .route("/events/analytics/recent", get(recent_events))
        .route("/events/analytics/top-past-location", get(top_past_location))
        .route("/events/analytics/by-location", get(events_by_location))
        .route("/events/analytics/by-month", get(events_by_month))
        .route("/events/analytics/by-title", get(event_by_title))
}
