mod cache_store;
mod command;
mod memory_store;

pub use self::cache_store::RedisCacheStore;
pub use self::command::CacheCommand;
pub use self::memory_store::MemoryCacheStore;
