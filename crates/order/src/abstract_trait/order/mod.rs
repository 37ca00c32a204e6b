mod repository;
mod service;
mod store;

pub use self::repository::{DynOrderRepository, OrderRepositoryTrait};
pub use self::service::{DynOrderService, OrderServiceTrait};
pub use self::store::{DynOrderStore, OrderStoreTrait};
