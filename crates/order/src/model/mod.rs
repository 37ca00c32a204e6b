mod order;
mod order_item;
mod status;

pub use self::order::{
    MAX_ITEM_QUANTITY, MONEY_SCALE, Order, OrderRow, ValidationError, check_price, max_money,
};
pub use self::order_item::{OrderItem, OrderItemRow};
pub use self::status::{
    OrderStatus, TRANSITIONS, UnknownStatus, can_cancel, can_delete, is_valid_transition,
};
