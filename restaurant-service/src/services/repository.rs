use crate::models::{Restaurant, RestaurantUpdate};
use crate::services::MongoDb;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;
use service_core::error::AppError;

/// Storage collaborator for restaurant records.
///
/// Every method performs a single storage operation. Ids are 24-character hex
/// ObjectIds; an id that does not parse is a storage error.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Up to `limit` records in storage order.
    async fn find(&self, limit: i64) -> Result<Vec<Restaurant>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>, AppError>;

    /// Insert a new record and return it with its assigned id.
    async fn create(&self, restaurant: Restaurant) -> Result<Restaurant, AppError>;

    /// Set the present fields of `update`. A missing record is not an error.
    async fn update_by_id(&self, id: &str, update: RestaurantUpdate) -> Result<(), AppError>;

    /// Remove the record if it exists.
    async fn remove_by_id(&self, id: &str) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    async fn disconnect(&self) -> Result<(), AppError>;
}

pub fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    Ok(ObjectId::parse_str(id)?)
}

#[derive(Clone)]
pub struct MongoRestaurantRepository {
    db: MongoDb,
}

impl MongoRestaurantRepository {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    /// Connect to `database` at `uri` and make sure indexes exist.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let db = MongoDb::connect(uri, database).await?;
        db.initialize_indexes().await?;
        Ok(Self::new(db))
    }

    pub fn db(&self) -> &MongoDb {
        &self.db
    }
}

#[async_trait]
impl RestaurantRepository for MongoRestaurantRepository {
    async fn find(&self, limit: i64) -> Result<Vec<Restaurant>, AppError> {
        let options = FindOptions::builder().limit(limit).build();
        let cursor = self.db.restaurants().find(None, options).await?;
        let restaurants: Vec<Restaurant> = cursor.try_collect().await?;
        Ok(restaurants)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>, AppError> {
        let oid = parse_id(id)?;
        let restaurant = self
            .db
            .restaurants()
            .find_one(doc! { "_id": oid }, None)
            .await?;
        Ok(restaurant)
    }

    async fn create(&self, mut restaurant: Restaurant) -> Result<Restaurant, AppError> {
        let result = self.db.restaurants().insert_one(&restaurant, None).await?;
        let oid = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })?;
        restaurant.id = Some(oid);
        Ok(restaurant)
    }

    async fn update_by_id(&self, id: &str, update: RestaurantUpdate) -> Result<(), AppError> {
        let oid = parse_id(id)?;
        if update.is_empty() {
            return Ok(());
        }

        let set = update
            .to_set_document()
            .map_err(|e| AppError::DatabaseError(anyhow::Error::new(e)))?;
        self.db
            .restaurants()
            .update_one(doc! { "_id": oid }, doc! { "$set": set }, None)
            .await?;
        Ok(())
    }

    async fn remove_by_id(&self, id: &str) -> Result<(), AppError> {
        let oid = parse_id(id)?;
        self.db
            .restaurants()
            .delete_one(doc! { "_id": oid }, None)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db.health_check().await
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        self.db.shutdown().await;
        Ok(())
    }
}
