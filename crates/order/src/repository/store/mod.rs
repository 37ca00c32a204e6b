mod memory;
mod postgres;

pub use self::memory::MemoryOrderStore;
pub use self::postgres::PgOrderStore;
