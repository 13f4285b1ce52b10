pub mod health;
pub mod restaurants;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use restaurants::{
    create_restaurant, delete_restaurant, get_restaurant, list_restaurants, not_found,
    update_restaurant,
};
