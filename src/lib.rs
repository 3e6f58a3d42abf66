//! Release promotion for omnibus-built packages
//!
//! Fetches the artifacts of one release from the artifact store, installs
//! them into the local package repositories of every supported platform
//! and rebuilds the repository metadata.

pub mod catalog;
pub mod cdn;
pub mod core;
pub mod orchestration;
pub mod planning;
pub mod security;
pub mod storage;
pub mod validation;

pub use catalog::{Platform, PlatformCatalog};
pub use crate::core::*;
pub use orchestration::{PromotionReport, Promoter};
pub use planning::{PromotionPlan, Release};
pub use security::{CommandError, SafeCommandExecutor};
