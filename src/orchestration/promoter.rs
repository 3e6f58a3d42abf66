//! Promoter - Main orchestrator for release promotion
//!
//! Manages the complete promotion workflow:
//! - Plan derivation from the platform catalog
//! - Artifact fetching with operator confirmation on failures
//! - Ownership repair on repository directories
//! - Repository commands with operator confirmation on failures
//! - CDN purge and the final report

use super::fetcher::{FetchReport, fetch_artifacts};
use super::permissions::{OwnershipFix, fix_permissions};
use super::runner::{CommandReport, default_allowed_commands, run_commands};
use crate::catalog::PlatformCatalog;
use crate::cdn::FastlyPurger;
use crate::core::error::PromoteError;
use crate::core::traits::{ArtifactStore, Prompter};
use crate::planning::{PromotionPlan, Release};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Result of the CDN purge stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PurgeStatus {
    NotConfigured,
    Purged { service_id: String },
    Failed { reason: String },
}

/// Promotion report returned after a completed run
#[derive(Debug, Clone, Serialize)]
pub struct PromotionReport {
    pub release: Release,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Wall time in milliseconds
    pub duration: u64,
    pub fetch: FetchReport,
    pub ownership: Vec<OwnershipFix>,
    pub commands: CommandReport,
    pub purge: PurgeStatus,
}

impl PromotionReport {
    /// Print the end-of-run summary
    pub fn print_summary(&self) {
        println!("\n📋 Promotion summary for {}", self.release);
        println!(
            "  📦 Artifacts: {} downloaded, {} skipped, {} failed",
            self.fetch.downloaded.len(),
            self.fetch.skipped.len(),
            self.fetch.failed.len()
        );
        println!(
            "  🛠️  Commands: {} succeeded, {} failed",
            self.commands.succeeded.len(),
            self.commands.failed.len()
        );
        match &self.purge {
            PurgeStatus::NotConfigured => println!("  🌐 CDN purge: not configured"),
            PurgeStatus::Purged { service_id } => {
                println!("  🌐 CDN purge: purged service {}", service_id)
            }
            PurgeStatus::Failed { reason } => println!("  ⚠️  CDN purge failed: {}", reason),
        }
        println!("  ⏱️  Duration: {}ms", self.duration);
    }
}

/// Main release promoter
pub struct Promoter {
    store: Arc<dyn ArtifactStore>,
    prompter: Arc<dyn Prompter>,
    catalog: PlatformCatalog,
    release: Release,
    bucket: String,
    ignore_failures: bool,
    purger: Option<FastlyPurger>,
    allowed_commands: Vec<String>,
}

impl Promoter {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        prompter: Arc<dyn Prompter>,
        catalog: PlatformCatalog,
        release: Release,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            prompter,
            catalog,
            release,
            bucket: bucket.into(),
            ignore_failures: false,
            purger: None,
            allowed_commands: default_allowed_commands(),
        }
    }

    /// Continue past failures without asking
    pub fn ignore_failures(mut self, ignore: bool) -> Self {
        self.ignore_failures = ignore;
        self
    }

    pub fn with_purger(mut self, purger: FastlyPurger) -> Self {
        self.purger = Some(purger);
        self
    }

    /// Replace the programs repository commands may start
    pub fn with_allowed_commands(mut self, allowed: Vec<String>) -> Self {
        self.allowed_commands = allowed;
        self
    }

    /// Derive the plan without side effects
    pub fn plan(&self) -> Result<PromotionPlan, PromoteError> {
        PromotionPlan::build(&self.catalog, &self.release)
    }

    /// Run the full promotion
    ///
    /// # Errors
    ///
    /// `PromoteError::Aborted` when the operator declines to continue after
    /// failures; any fatal error from planning, fetching or ownership repair.
    pub async fn promote(&self) -> Result<PromotionReport, PromoteError> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        println!("🚀 Promoting {}\n", self.release);
        let plan = self.plan()?;
        info!(
            targets = self.catalog.target_count(),
            artifacts = plan.artifacts.len(),
            commands = plan.commands.len(),
            "promotion plan derived"
        );

        // 1. Fetch
        println!("📥 Fetching artifacts...");
        let fetch =
            fetch_artifacts(self.store.as_ref(), &self.bucket, &plan.artifacts).await?;
        println!();

        if fetch.has_failures() {
            println!("⚠️  Failed to fetch {} artifact(s):", fetch.failed.len());
            for failure in &fetch.failed {
                println!("  - {}", failure.source);
            }
            self.confirm_continue("fetch", "Continue despite missing artifacts?")
                .await?;
        }

        // 2. Ownership
        println!("🔧 Fixing permissions...");
        let ownership = fix_permissions(&self.catalog)?;
        println!();

        // 3. Repository commands
        println!("🛠️  Running commands...");
        let commands = run_commands(&plan.commands, &self.allowed_commands).await;
        println!();

        if commands.has_failures() {
            println!("⚠️  {} command(s) failed:", commands.failed.len());
            for failure in &commands.failed {
                println!("  - {}", failure.command);
            }
            self.confirm_continue("command", "Continue despite failed commands?")
                .await?;
        }

        // 4. CDN purge
        let purge = self.purge().await;

        Ok(PromotionReport {
            release: self.release.clone(),
            started_at,
            finished_at: Utc::now(),
            duration: start_time.elapsed().as_millis() as u64,
            fetch,
            ownership,
            commands,
            purge,
        })
    }

    async fn confirm_continue(&self, stage: &str, question: &str) -> Result<(), PromoteError> {
        if self.ignore_failures {
            println!("  ⚠️  Ignoring {} failures (ignore_failures is set)\n", stage);
            return Ok(());
        }

        if self.prompter.confirm(question).await? {
            println!();
            Ok(())
        } else {
            Err(PromoteError::Aborted {
                stage: stage.to_string(),
            })
        }
    }

    async fn purge(&self) -> PurgeStatus {
        let Some(purger) = &self.purger else {
            return PurgeStatus::NotConfigured;
        };

        println!("🌐 Purging CDN cache...");
        match purger.purge_all().await {
            Ok(()) => {
                println!("  ✅ Purged Fastly service {}", purger.service_id());
                PurgeStatus::Purged {
                    service_id: purger.service_id().to_string(),
                }
            }
            Err(e) => {
                println!("  ⚠️  {}", e);
                PurgeStatus::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
