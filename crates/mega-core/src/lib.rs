pub mod config;
pub mod error;
pub mod logging;

pub use config::MegaConfig;
pub use error::{MegaError, MegaResult};
