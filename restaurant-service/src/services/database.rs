use crate::models::Restaurant;
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

pub const RESTAURANTS_COLLECTION: &str = "restaurants";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);

        // The driver connects lazily; ping so a bad URL fails startup.
        let mongo = Self { client, db };
        mongo.health_check().await?;

        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(mongo)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for restaurant-service");

        let borough_cuisine_index = IndexModel::builder()
            .keys(doc! { "borough": 1, "cuisine": 1 })
            .options(
                IndexOptions::builder()
                    .name("borough_cuisine_lookup".to_string())
                    .build(),
            )
            .build();

        self.restaurants()
            .create_index(borough_cuisine_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create borough_cuisine index on restaurants collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on restaurants.(borough, cuisine)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    /// Close pooled connections and stop the driver's background tasks.
    pub async fn shutdown(&self) {
        tracing::info!("Closing MongoDB connection");
        self.client.clone().shutdown().await;
    }

    pub fn restaurants(&self) -> Collection<Restaurant> {
        self.db.collection(RESTAURANTS_COLLECTION)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
