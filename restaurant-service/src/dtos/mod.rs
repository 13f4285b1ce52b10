pub mod restaurants;

pub use restaurants::{
    CreateRestaurantRequest, GradeRequest, RestaurantListResponse, RestaurantResponse,
    UpdateRestaurantRequest,
};
