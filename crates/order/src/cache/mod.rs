mod order_cache;
mod policy;

pub use self::order_cache::{CacheLookup, OrderCache};
pub use self::policy::CacheWritePolicy;
