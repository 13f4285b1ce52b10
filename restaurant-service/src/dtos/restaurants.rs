use crate::models::serde_helpers::{non_null, optional_date, optional_number, optional_text};
use crate::models::{Address, Grade, Restaurant, RestaurantUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Wire representation of a restaurant. `grade` and `address` are derived on
/// every conversion and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantResponse {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub borough: String,
    pub grade: Option<String>,
    pub address: String,
}

impl From<&Restaurant> for RestaurantResponse {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id_hex(),
            name: restaurant.name.clone(),
            cuisine: restaurant.cuisine.clone(),
            borough: restaurant.borough.clone(),
            grade: restaurant.current_grade().map(str::to_string),
            address: restaurant.address_string(),
        }
    }
}

impl From<Restaurant> for RestaurantResponse {
    fn from(restaurant: Restaurant) -> Self {
        Self::from(&restaurant)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestaurantListResponse {
    pub restaurants: Vec<RestaurantResponse>,
}

/// A submitted grade. Dates may be RFC 3339, a bare date or epoch millis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub score: Option<f64>,
}

impl From<GradeRequest> for Grade {
    fn from(request: GradeRequest) -> Self {
        Self {
            date: request.date.map(mongodb::bson::DateTime::from_chrono),
            grade: request.grade,
            score: request.score,
        }
    }
}

/// Body of `POST /restaurants`. Fields other than these five are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRestaurantRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "borough is required"),
        length(min = 1, message = "borough must not be empty")
    )]
    pub borough: Option<String>,
    #[validate(
        required(message = "cuisine is required"),
        length(min = 1, message = "cuisine must not be empty")
    )]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub grades: Option<Vec<GradeRequest>>,
}

impl CreateRestaurantRequest {
    /// Build the record to insert. Call after `validate()`.
    pub fn into_restaurant(self) -> Restaurant {
        Restaurant::new(
            self.name.unwrap_or_default(),
            self.borough.unwrap_or_default(),
            self.cuisine.unwrap_or_default(),
            self.address.unwrap_or_default(),
            self.grades
                .unwrap_or_default()
                .into_iter()
                .map(Grade::from)
                .collect(),
        )
    }
}

/// Body of `PUT /restaurants/:id`. Only the whitelisted fields are copied into
/// the update; `id` must repeat the path id. An explicit `null` for an
/// updatable field is rejected rather than skipped.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRestaurantRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 1, message = "borough must not be empty"))]
    pub borough: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(length(min = 1, message = "cuisine must not be empty"))]
    pub cuisine: Option<String>,
    #[serde(default, deserialize_with = "non_null")]
    pub address: Option<Address>,
}

impl UpdateRestaurantRequest {
    pub fn matches_path_id(&self, path_id: &str) -> bool {
        !path_id.is_empty() && self.id.as_deref() == Some(path_id)
    }

    pub fn into_update(self) -> RestaurantUpdate {
        RestaurantUpdate {
            name: self.name,
            borough: self.borough,
            cuisine: self.cuisine,
            address: self.address,
        }
    }
}
