//! Process-local restaurant storage for tests and local development.
//!
//! Follows the same rules as the MongoDB repository: ids are freshly minted
//! ObjectIds, records come back in insertion order, and an id that does not
//! parse fails the operation.

use crate::models::{Restaurant, RestaurantUpdate};
use crate::services::repository::{parse_id, RestaurantRepository};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Default)]
pub struct InMemoryRestaurantRepository {
    records: Arc<RwLock<Vec<Restaurant>>>,
    disconnected: Arc<AtomicBool>,
}

impl InMemoryRestaurantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<(), AppError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(AppError::DatabaseError(anyhow::anyhow!(
                "In-memory repository is disconnected"
            )))
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Restaurant>>, AppError> {
        self.ensure_connected()?;
        self.records
            .read()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("Restaurant store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Restaurant>>, AppError> {
        self.ensure_connected()?;
        self.records
            .write()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("Restaurant store lock poisoned")))
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryRestaurantRepository {
    async fn find(&self, limit: i64) -> Result<Vec<Restaurant>, AppError> {
        let records = self.read()?;
        // Mongo treats a zero or negative limit as "no limit".
        let take = if limit > 0 {
            limit as usize
        } else {
            records.len()
        };
        Ok(records.iter().take(take).cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Restaurant>, AppError> {
        let oid = parse_id(id)?;
        let records = self.read()?;
        Ok(records.iter().find(|r| r.id == Some(oid)).cloned())
    }

    async fn create(&self, mut restaurant: Restaurant) -> Result<Restaurant, AppError> {
        let mut records = self.write()?;
        let id = restaurant.id.unwrap_or_else(ObjectId::new);
        if records.iter().any(|r| r.id == Some(id)) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Duplicate key: {}",
                id.to_hex()
            )));
        }
        restaurant.id = Some(id);
        records.push(restaurant.clone());
        Ok(restaurant)
    }

    async fn update_by_id(&self, id: &str, update: RestaurantUpdate) -> Result<(), AppError> {
        let oid = parse_id(id)?;
        let mut records = self.write()?;
        if let Some(restaurant) = records.iter_mut().find(|r| r.id == Some(oid)) {
            update.apply_to(restaurant);
        }
        Ok(())
    }

    async fn remove_by_id(&self, id: &str) -> Result<(), AppError> {
        let oid = parse_id(id)?;
        let mut records = self.write()?;
        records.retain(|r| r.id != Some(oid));
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.ensure_connected()
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        self.disconnected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
