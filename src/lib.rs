pub mod args;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod favorites;
pub mod model;
pub mod repo;
pub mod report;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use repo::Mode;
