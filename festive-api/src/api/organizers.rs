//! Organizer endpoints: CRUD plus analytics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use festive_common::models::TRACKED_EVENT_YEAR;
use festive_common::services::{CompanyEvents, RegionLeader, TopOrganizer};
use festive_common::{Organizer, OrganizerDraft};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// POST /organizers
pub async fn create_organizer(
    State(state): State<AppState>,
    Json(draft): Json<OrganizerDraft>,
) -> ApiResult<(StatusCode, Json<Organizer>)> {
    let organizer = state.organizers.create(draft).await?;
    Ok((StatusCode::CREATED, Json(organizer)))
}

/// GET /organizers
pub async fn list_organizers(State(state): State<AppState>) -> ApiResult<Json<Vec<Organizer>>> {
    Ok(Json(state.organizers.list().await?))
}

/// GET /organizers/:id
pub async fn get_organizer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Organizer>> {
    Ok(Json(state.organizers.get(&id).await?))
}

/// PUT /organizers/:id
pub async fn update_organizer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<OrganizerDraft>,
) -> ApiResult<Json<Organizer>> {
    Ok(Json(state.organizers.update(&id, draft).await?))
}

/// DELETE /organizers/:id
pub async fn delete_organizer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Organizer>> {
    Ok(Json(state.organizers.delete(&id).await?))
}

/// GET /organizers/analytics/company-events?company=
pub async fn company_events(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> ApiResult<Json<CompanyEvents>> {
    let company = query
        .company
        .filter(|company| !company.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing query parameter: company".to_string()))?;
    Ok(Json(state.organizers.events_managed_by(&company).await?))
}

/// GET /organizers/analytics/top-region
pub async fn top_region(State(state): State<AppState>) -> ApiResult<Json<RegionLeader>> {
    Ok(Json(state.organizers.region_with_most_cultural_events().await?))
}

/// GET /organizers/analytics/top-organizer?year=
pub async fn top_organizer(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<TopOrganizer>> {
    let year = query.year.unwrap_or(TRACKED_EVENT_YEAR);
    Ok(Json(state.organizers.top_organizer_for_year(year).await?))
}

/// GET /organizers/analytics/top-organizer-2025
pub async fn top_organizer_tracked_year(
    State(state): State<AppState>,
) -> ApiResult<Json<TopOrganizer>> {
    Ok(Json(
        state
            .organizers
            .top_organizer_for_year(TRACKED_EVENT_YEAR)
            .await?,
    ))
}

/// Build organizer routes
pub fn organizer_routes() -> Router<AppState> {
    Router::new()
        .route("/organizers", get(list_organizers).post(create_organizer))
        .route(
            "/organizers/:id",
            get(get_organizer)
                .put(update_organizer)
                .delete(delete_organizer),
        )
        .route("/organizers/analytics/company-events", get(company_events))
        .route("/organizers/analytics/top-region", get(top_region))
        .route("/organizers/analytics/top-organizer", get(top_organizer))
        .route(
            "/organizers/analytics/top-organizer-2025",
            get(top_organizer_tracked_year),
        )
}
