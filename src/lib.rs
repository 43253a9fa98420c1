pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod proto;
pub mod services;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use ledger::Ledger;
