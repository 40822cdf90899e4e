pub mod json_store;
mod lock;

pub use lock::StoreLock;
