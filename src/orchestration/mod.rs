//! Orchestration layer for release promotion
//!
//! This module provides the pipeline stages (fetch, ownership repair,
//! repository commands, upload) and the `Promoter` that drives them.

pub mod fetcher;
pub mod permissions;
pub mod promoter;
pub mod prompt;
pub mod runner;
pub mod uploader;

// Re-export main types for convenience
pub use fetcher::{FetchFailure, FetchReport, fetch_artifacts};
pub use permissions::{OwnershipFix, fix_permissions};
pub use promoter::{PromotionReport, Promoter, PurgeStatus};
pub use prompt::{LinePrompter, StdinPrompter};
pub use runner::{CommandFailure, CommandReport, run_commands};
pub use uploader::{UploadFailure, UploadReport, upload_artifacts};
