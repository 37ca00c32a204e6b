pub mod context;
pub mod jwt;
pub mod recovery;
pub mod validate;
