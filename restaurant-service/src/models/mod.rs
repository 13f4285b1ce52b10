pub mod restaurant;
pub mod serde_helpers;

pub use restaurant::{Address, Grade, Restaurant, RestaurantUpdate};
