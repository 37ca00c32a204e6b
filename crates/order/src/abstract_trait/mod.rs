pub mod order;

pub use self::order::{
    DynOrderRepository, DynOrderService, DynOrderStore, OrderRepositoryTrait,
    OrderServiceTrait, OrderStoreTrait,
};
