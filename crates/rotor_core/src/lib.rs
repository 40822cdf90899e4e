pub mod board;
pub mod config;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod session;
pub mod state_machine;
pub mod storage;
