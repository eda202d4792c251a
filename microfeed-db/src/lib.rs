pub mod backend;
pub mod memory;
pub mod postgres;
pub mod store;

mod record;

pub use sqlx;
