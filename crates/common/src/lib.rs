pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, Credentials};
pub use error::HeraldError;
