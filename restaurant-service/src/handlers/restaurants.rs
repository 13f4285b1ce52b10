use crate::dtos::{
    CreateRestaurantRequest, RestaurantListResponse, RestaurantResponse, UpdateRestaurantRequest,
};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::{AppError, ErrorResponse, NOT_FOUND_MESSAGE};
use validator::Validate;

/// Most records returned by the list endpoint.
pub const LIST_LIMIT: i64 = 10;

fn invalid_json(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(anyhow::anyhow!(rejection.body_text()))
}

/// Lists up to `LIST_LIMIT` restaurants.
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<RestaurantListResponse>, AppError> {
    let restaurants = state.repository.find(LIST_LIMIT).await?;

    Ok(Json(RestaurantListResponse {
        restaurants: restaurants.iter().map(RestaurantResponse::from).collect(),
    }))
}

/// Fetches one restaurant by id.
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantResponse>, AppError> {
    let restaurant = state
        .repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Restaurant {} not found", id)))?;

    Ok(Json(RestaurantResponse::from(restaurant)))
}

/// Validates and stores a new restaurant.
pub async fn create_restaurant(
    State(state): State<AppState>,
    payload: Result<Json<CreateRestaurantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RestaurantResponse>), AppError> {
    let Json(payload) = payload.map_err(invalid_json)?;
    payload.validate()?;

    let restaurant = state
        .repository
        .create(payload.into_restaurant())
        .await?;

    tracing::info!(
        restaurant_id = %restaurant.id_hex(),
        name = %restaurant.name,
        "Restaurant created"
    );

    Ok((StatusCode::CREATED, Json(RestaurantResponse::from(restaurant))))
}

/// Applies a partial update; the body id must repeat the path id.
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRestaurantRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload.map_err(invalid_json)?;

    if !payload.matches_path_id(&id) {
        let message = format!(
            "Request path id ({}) and request body id ({}) must match",
            id,
            payload.id.as_deref().unwrap_or("undefined")
        );
        tracing::warn!("{}", message);
        return Err(AppError::BadRequest(anyhow::anyhow!(message)));
    }
    payload.validate()?;

    let update = payload.into_update();
    tracing::info!(restaurant_id = %id, update = ?update, "Updating restaurant");

    state.repository.update_by_id(&id, update).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes a restaurant. Missing records still return 204.
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repository.remove_by_id(&id).await?;

    tracing::info!(restaurant_id = %id, "Restaurant deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Catch-all for unknown paths and unsupported methods.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(NOT_FOUND_MESSAGE)),
    )
}
