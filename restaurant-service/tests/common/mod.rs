#![allow(dead_code)]

use mongodb::bson::DateTime;
use restaurant_service::config::{MongoConfig, RestaurantConfig};
use restaurant_service::models::{Address, Grade, Restaurant};
use restaurant_service::services::{InMemoryRestaurantRepository, RestaurantRepository};
use restaurant_service::startup::{Application, RunningApplication};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub fn test_config(database: &str) -> RestaurantConfig {
    RestaurantConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            ..CoreConfig::default()
        },
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: database.to_string(),
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: InMemoryRestaurantRepository,
    pub client: reqwest::Client,
    running: RunningApplication,
}

impl TestApp {
    /// Start the service on a random port over an empty in-memory repository.
    pub async fn spawn() -> Self {
        let repository = InMemoryRestaurantRepository::new();
        let config = test_config(&format!("restaurant_test_{}", uuid::Uuid::new_v4()));

        let app = Application::build_with_repository(config, Arc::new(repository.clone()))
            .await
            .expect("Failed to build test application");

        let running = app.spawn();
        let port = running.port();

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            repository,
            client: reqwest::Client::new(),
            running,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Insert `count` generated restaurants straight into storage.
    pub async fn seed(&self, count: usize) -> Vec<Restaurant> {
        let mut seeded = Vec::with_capacity(count);
        for i in 0..count {
            let restaurant = self
                .repository
                .create(seed_restaurant(i))
                .await
                .expect("Failed to seed restaurant");
            seeded.push(restaurant);
        }
        seeded
    }

    pub async fn stop(self) {
        self.running.stop().await.expect("Failed to stop test application");
    }
}

pub fn seed_restaurant(i: usize) -> Restaurant {
    let boroughs = ["Manhattan", "Brooklyn", "Queens", "Bronx", "Staten Island"];
    let cuisines = ["Irish", "American", "Bakery", "Chinese", "Italian"];
    let letters = ["A", "B", "C"];
    let base = 1_400_000_000_000_i64 + (i as i64) * 86_400_000;

    Restaurant::new(
        format!("Seed Restaurant {}", i),
        boroughs[i % boroughs.len()].to_string(),
        cuisines[i % cuisines.len()].to_string(),
        Address {
            building: Some(format!("{}", 100 + i)),
            street: Some("Morris Park Ave".to_string()),
            zipcode: Some("10462".to_string()),
            coord: vec!["-73.856077".to_string(), "40.848447".to_string()],
        },
        vec![
            Grade {
                date: Some(DateTime::from_millis(base)),
                grade: Some(letters[(i + 1) % 3].to_string()),
                score: Some(10.0),
            },
            Grade {
                date: Some(DateTime::from_millis(base + 1_000)),
                grade: Some(letters[i % 3].to_string()),
                score: Some(4.0),
            },
        ],
    )
}

pub fn new_restaurant_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Test Restaurant",
        "borough": "Brooklyn",
        "cuisine": "jamaican",
        "address": {
            "building": "123",
            "street": "Man st",
            "zipcode": "12345"
        },
        "grades": [
            { "date": "2017-05-15T18:34:10.847Z", "grade": "A" },
            { "date": "2017-04-29T03:30:15.836Z", "grade": "A" },
            { "date": "2017-08-14T10:22:28.453Z", "grade": "A" }
        ]
    })
}
