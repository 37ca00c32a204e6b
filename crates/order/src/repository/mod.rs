mod order;
pub mod store;

pub use self::order::OrderRepository;
