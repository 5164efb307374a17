pub mod app_config;
pub mod database;
pub mod order_repo;
pub mod petpooja;
pub mod redis_repo;

pub use database::DbClient;
pub use order_repo::StoreOrderRepository;
pub use petpooja::PetpoojaClient;
pub use redis_repo::RedisClient;
