use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Order, SyncRecord};
use crate::repository::{OrderRepository, RepoError};

/// Process-local order store, used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes soft-deleted orders.
    pub async fn snapshot(&self, id: Uuid) -> Option<Order> {
        self.orders.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: &Order) -> Result<Uuid, RepoError> {
        let mut orders = self.orders.write().await;
        if orders.values().any(|o| o.order_number == order.order_number && !o.is_deleted) {
            return Err(format!("duplicate order number {}", order.order_number).into());
        }
        orders.insert(order.id, order.clone());
        Ok(order.id)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        Ok(self.orders.read().await.get(&id).filter(|o| !o.is_deleted).cloned())
    }

    async fn find_by_external_id(
        &self,
        restaurant_id: &str,
        external_order_id: &str,
    ) -> Result<Option<Order>, RepoError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| {
                !o.is_deleted
                    && o.restaurant_id == restaurant_id
                    && o.external_order_id.as_deref() == Some(external_order_id)
            })
            .cloned())
    }

    async fn update_order(&self, order: &Order) -> Result<(), RepoError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(existing) if !existing.is_deleted => {
                *existing = order.clone();
                Ok(())
            }
            _ => Err(format!("order {} not found", order.id).into()),
        }
    }

    async fn record_sync(&self, id: Uuid, record: &SyncRecord) -> Result<(), RepoError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if !order.is_deleted => {
                order.record_sync(record.clone());
                Ok(())
            }
            _ => Err(format!("order {} not found", id).into()),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if !order.is_deleted => {
                order.is_deleted = true;
                order.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[tokio::test]
    async fn test_soft_delete_hides_order() {
        let repo = InMemoryOrderRepository::new();
        let order = fixtures::order();
        repo.create_order(&order).await.unwrap();

        assert!(repo.soft_delete(order.id).await.unwrap());
        assert!(repo.get_order(order.id).await.unwrap().is_none());
        assert!(!repo.soft_delete(order.id).await.unwrap());
        assert!(repo.snapshot(order.id).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_find_by_external_id_is_scoped_to_restaurant() {
        let repo = InMemoryOrderRepository::new();
        let mut order = fixtures::order();
        order.external_order_id = Some("9001".to_string());
        repo.create_order(&order).await.unwrap();

        assert!(repo.find_by_external_id("rest-1", "9001").await.unwrap().is_some());
        assert!(repo.find_by_external_id("rest-2", "9001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_order_number_rejected() {
        let repo = InMemoryOrderRepository::new();
        repo.create_order(&fixtures::order()).await.unwrap();
        assert!(repo.create_order(&fixtures::order()).await.is_err());
    }

    #[tokio::test]
    async fn test_record_sync_requires_live_order() {
        let repo = InMemoryOrderRepository::new();
        let order = fixtures::order();
        assert!(repo.record_sync(order.id, &SyncRecord::success()).await.is_err());

        repo.create_order(&order).await.unwrap();
        repo.record_sync(order.id, &SyncRecord::failed("timeout")).await.unwrap();
        assert_eq!(repo.get_order(order.id).await.unwrap().unwrap().sync_status(), Some(crate::models::SyncStatus::Failed));

        repo.soft_delete(order.id).await.unwrap();
        assert!(repo.record_sync(order.id, &SyncRecord::success()).await.is_err());
    }
}
