mod cache;
mod jwt;

pub use self::cache::{DistributedCacheTrait, DynDistributedCache};
pub use self::jwt::{DynJwtService, JwtServiceTrait};
