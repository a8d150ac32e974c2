//! HTTP surface for the trip-planning API
//!
//! Thin axum handlers over `TripService`. Caller identity arrives as an
//! `x-user-id` header installed by the upstream auth collaborator; this
//! layer only resolves it and enforces trip ownership.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Json;
use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::TripMateError;
use crate::recommend::recommend_packing;
use crate::trips::TripService;

/// Shared handler state
pub type AppState = Arc<TripService>;

/// Resolved caller identity
///
/// Rejects with 401 when the header is absent or unparseable; ownership
/// checks against the resolved id happen per handler.
#[derive(Debug)]
pub struct Caller(pub i64);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = TripMateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .ok_or_else(|| TripMateError::unauthorized("Missing caller identity"))?
            .to_str()
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or_else(|| TripMateError::unauthorized("Invalid caller identity"))?;

        Ok(Caller(user_id))
    }
}

#[derive(Debug, Deserialize)]
pub struct TripRequest {
    pub location: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub date: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct PackingItemRequest {
    pub item_name: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PackingItemUpdateRequest {
    pub is_checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default)]
    pub weather: String,
    /// Comma-separated activity tags
    #[serde(default)]
    pub activities: String,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/trips", post(create_trip).get(list_trips))
        .route("/trips/recommendations", get(get_recommendations))
        .route(
            "/trips/{trip_id}",
            get(get_trip).patch(update_trip).delete(delete_trip),
        )
        .route("/trips/{trip_id}/weather", get(get_trip_weather))
        .route(
            "/trips/{trip_id}/activities",
            post(add_activity).get(list_activities),
        )
        .route(
            "/trips/{trip_id}/packinglist",
            post(add_packing_item).get(list_packing_items),
        )
        .route(
            "/packing-items/{item_id}",
            patch(update_packing_item).delete(delete_packing_item),
        )
        .with_state(state)
}

async fn create_trip(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Json(body): Json<TripRequest>,
) -> Result<(StatusCode, Json<Value>), TripMateError> {
    let trip = service
        .create_trip(user_id, &body.location, &body.start_date, &body.end_date)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "trip": trip }))))
}

async fn list_trips(
    State(service): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<Value>, TripMateError> {
    let trips = service.list_trips(user_id).await?;
    Ok(Json(json!({ "trips": trips })))
}

async fn get_trip(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
) -> Result<Json<Value>, TripMateError> {
    let trip = service.get_owned_trip(trip_id, user_id).await?;
    Ok(Json(json!({ "trip": trip })))
}

async fn update_trip(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
    Json(body): Json<TripRequest>,
) -> Result<Json<Value>, TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    let trip = service
        .update_trip(trip_id, &body.location, &body.start_date, &body.end_date)
        .await?;
    Ok(Json(json!({ "trip": trip })))
}

async fn delete_trip(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
) -> Result<Json<Value>, TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    service.delete_trip(trip_id).await?;
    Ok(Json(json!({ "deleted": trip_id })))
}

async fn get_trip_weather(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
) -> Result<Json<Value>, TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    let weather = service.get_weather(trip_id).await?;
    Ok(Json(json!({ "weather": &*weather })))
}

async fn add_activity(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
    Json(body): Json<ActivityRequest>,
) -> Result<(StatusCode, Json<Value>), TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    let activity = service
        .add_activity(trip_id, &body.date, &body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "activity": activity }))))
}

async fn list_activities(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
) -> Result<Json<Value>, TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    let activities = service.list_activities(trip_id).await?;
    Ok(Json(json!({ "activities": activities })))
}

async fn add_packing_item(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
    Json(body): Json<PackingItemRequest>,
) -> Result<(StatusCode, Json<Value>), TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    let item = service
        .add_packing_item(trip_id, &body.item_name, body.category.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "packingListItem": item })),
    ))
}

async fn list_packing_items(
    State(service): State<AppState>,
    Caller(user_id): Caller,
    Path(trip_id): Path<i64>,
) -> Result<Json<Value>, TripMateError> {
    service.get_owned_trip(trip_id, user_id).await?;
    let items = service.list_packing_items(trip_id).await?;
    Ok(Json(json!({ "packingList": items })))
}

async fn update_packing_item(
    State(service): State<AppState>,
    Caller(_user_id): Caller,
    Path(item_id): Path<i64>,
    Json(body): Json<PackingItemUpdateRequest>,
) -> Result<Json<Value>, TripMateError> {
    let item = service
        .set_packing_item_checked(item_id, body.is_checked)
        .await?;
    Ok(Json(json!({ "packingItem": item })))
}

async fn delete_packing_item(
    State(service): State<AppState>,
    Caller(_user_id): Caller,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>, TripMateError> {
    service.delete_packing_item(item_id).await?;
    Ok(Json(json!({ "deleted": item_id })))
}

async fn get_recommendations(
    Query(query): Query<RecommendationsQuery>,
) -> Json<Value> {
    let tags: Vec<String> = query
        .activities
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect();

    let items = recommend_packing(&query.weather, &tags);
    Json(json!({ "packingList": items }))
}
