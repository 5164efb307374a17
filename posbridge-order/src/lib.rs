pub mod memory;
pub mod models;
pub mod orchestrator;
pub mod payload;
pub mod repository;
pub mod status_update;

pub use memory::InMemoryOrderRepository;
pub use models::{NewOrder, Order, OrderError, OrderItem, OrderStatus, OrderType, SyncRecord, SyncStatus};
pub use orchestrator::{CallbackOutcome, OrderSyncService, PushOutcome, StatusPushOutcome, SyncError};
pub use repository::{OrderRepository, RepoError};
pub use status_update::ValidatedStatusUpdate;
