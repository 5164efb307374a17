use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Order, SyncRecord};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for order persistence. Soft-deleted orders are invisible to every read.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &Order) -> Result<Uuid, RepoError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError>;

    async fn find_by_external_id(
        &self,
        restaurant_id: &str,
        external_order_id: &str,
    ) -> Result<Option<Order>, RepoError>;

    /// Persist status, external id, sync record and tracking details.
    async fn update_order(&self, order: &Order) -> Result<(), RepoError>;

    async fn record_sync(&self, id: Uuid, record: &SyncRecord) -> Result<(), RepoError>;

    /// Returns false when no live order matched.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError>;
}
