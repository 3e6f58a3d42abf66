pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;

pub use config::{Channel, PromoteConfig, PromoteSettings, Project};
pub use config_loader::{ConfigLoadOptions, ConfigLoader};
pub use error::*;
pub use traits::*;
