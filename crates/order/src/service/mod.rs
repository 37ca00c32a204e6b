mod order;

pub use self::order::OrderService;
