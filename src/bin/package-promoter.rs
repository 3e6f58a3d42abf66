//! Package Promoter CLI
//!
//! Promotes a built release into the local package repositories

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use package_promoter::catalog::PlatformCatalog;
use package_promoter::cdn::FastlyPurger;
use package_promoter::core::config::{AwsConfig, Channel, PromoteConfig, PromoteSettings, Project};
use package_promoter::core::config_loader::{ConfigLoadOptions, ConfigLoader};
use package_promoter::core::error::PromoteError;
use package_promoter::orchestration::{Promoter, StdinPrompter, upload_artifacts};
use package_promoter::planning::{PromotionPlan, build_upload_plan};
use package_promoter::storage::S3Store;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Release promotion for omnibus-built packages
#[derive(Parser)]
#[command(name = "package-promoter")]
#[command(version = "0.1.0")]
#[command(about = "Promote built packages into local package repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args)]
struct ReleaseArgs {
    /// Project to promote
    #[arg(short, long, value_enum)]
    project: Option<Project>,

    /// Project version (e.g. 1.0.0)
    #[arg(short = 'v', long = "version", value_name = "PROJECT_VERSION")]
    project_version: Option<String>,

    /// Build number of the release
    #[arg(short = 'n', long)]
    build_number: Option<String>,

    /// Artifact bucket
    #[arg(short, long)]
    bucket: Option<String>,

    /// AWS region
    #[arg(long)]
    aws_region: Option<String>,

    /// AWS access key id
    #[arg(long)]
    aws_access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long)]
    aws_secret_access_key: Option<String>,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Platform catalog file replacing the built-in catalog
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

impl ReleaseArgs {
    fn to_config(&self) -> PromoteConfig {
        let aws = AwsConfig {
            region: self.aws_region.clone(),
            access_key_id: self.aws_access_key_id.clone(),
            secret_access_key: self.aws_secret_access_key.clone(),
        };

        PromoteConfig {
            project: self.project,
            version: self.project_version.clone(),
            build_number: self.build_number.clone(),
            bucket: self.bucket.clone(),
            catalog_file: self.catalog.clone(),
            aws: (aws != AwsConfig::default()).then_some(aws),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a release and publish it into the package repositories
    Promote {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Release channel
        #[arg(short, long, value_enum)]
        channel: Option<Channel>,

        /// Continue past fetch and command failures without prompting
        #[arg(long)]
        ignore_failures: bool,

        /// Print the plan without fetching or running anything
        #[arg(long)]
        dry_run: bool,

        /// Print the dry-run plan as JSON
        #[arg(long, requires = "dry_run")]
        json: bool,

        /// Write the promotion report as JSON to FILE
        #[arg(long, value_name = "FILE", conflicts_with = "dry_run")]
        report: Option<PathBuf>,
    },

    /// Upload locally built deb and rpm packages to the artifact store
    Upload {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Channel the packages were built into
        #[arg(short, long, value_enum)]
        channel: Option<Channel>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            if let Some(promote_error) = e.downcast_ref::<PromoteError>() {
                for action in promote_error.suggested_actions() {
                    eprintln!("  💡 {}", action);
                }
            }
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Promote {
            release,
            channel,
            ignore_failures,
            dry_run,
            json,
            report,
        } => {
            let mut cli_args = release.to_config();
            cli_args.channel = channel;
            if ignore_failures {
                cli_args.ignore_failures = Some(true);
            }
            promote_command(release.config, cli_args, dry_run, json, report).await
        }
        Commands::Upload { release, channel } => {
            let mut cli_args = release.to_config();
            cli_args.channel = channel;
            upload_command(release.config, cli_args).await
        }
    }
}

async fn load_settings(config_file: Option<PathBuf>, cli_args: PromoteConfig) -> Result<PromoteSettings> {
    let options = ConfigLoadOptions {
        config_file,
        cli_args: Some(cli_args),
        env: std::env::vars().collect(),
    };

    Ok(ConfigLoader::load_settings(options).await?)
}

async fn load_catalog(settings: &PromoteSettings) -> Result<PlatformCatalog> {
    let catalog = match &settings.catalog_file {
        Some(path) => {
            debug!(path = %path.display(), "loading catalog file");
            PlatformCatalog::load_file(path).await?
        }
        None => PlatformCatalog::for_project(settings.project),
    };

    Ok(catalog)
}

fn connect_store(settings: &PromoteSettings) -> Result<S3Store> {
    let credentials = ConfigLoader::require_aws_credentials(settings)?;
    println!(
        "🔑 Using AWS access key {} in {}",
        credentials.masked_access_key_id(),
        settings.aws_region
    );

    Ok(S3Store::new(&settings.aws_region, credentials))
}

async fn promote_command(
    config_file: Option<PathBuf>,
    cli_args: PromoteConfig,
    dry_run: bool,
    json: bool,
    report_file: Option<PathBuf>,
) -> Result<i32> {
    let settings = load_settings(config_file, cli_args).await?;
    let catalog = load_catalog(&settings).await?;
    let release = settings.release();

    if dry_run {
        let plan = PromotionPlan::build(&catalog, &release)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("\n🧪 Dry run for {}\n", release);
            println!("{}", plan.render_text());
        }
        return Ok(0);
    }

    println!("\n📦 package-promoter\n");

    let store = connect_store(&settings)?;
    let mut promoter = Promoter::new(
        Arc::new(store),
        Arc::new(StdinPrompter::stdin()),
        catalog,
        release,
        settings.bucket.clone(),
    )
    .ignore_failures(settings.ignore_failures);

    if let Some(fastly) = &settings.fastly {
        promoter = promoter.with_purger(FastlyPurger::new(fastly));
    }

    match promoter.promote().await {
        Ok(report) => {
            report.print_summary();
            if let Some(path) = report_file {
                tokio::fs::write(&path, serde_json::to_string_pretty(&report)?).await?;
                println!("📝 Report written to {}", path.display());
            }
            println!("\n✅ Promotion completed");
            Ok(0)
        }
        Err(e) => {
            eprintln!("\n❌ Promotion failed: {}", e);
            for action in e.suggested_actions() {
                eprintln!("  💡 {}", action);
            }
            Ok(1)
        }
    }
}

async fn upload_command(config_file: Option<PathBuf>, cli_args: PromoteConfig) -> Result<i32> {
    let settings = load_settings(config_file, cli_args).await?;
    let catalog = load_catalog(&settings).await?;
    let release = settings.release();

    println!("\n📤 Uploading {}\n", release);

    let store = connect_store(&settings)?;
    let uploads = build_upload_plan(&release, &catalog);
    let report = upload_artifacts(&store, &settings.bucket, &uploads).await;

    println!(
        "\n📋 {} uploaded, {} missing, {} failed",
        report.uploaded.len(),
        report.missing.len(),
        report.failed.len()
    );

    if report.failed.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_channel_and_project_flags() {
        let cli = Cli::try_parse_from([
            "package-promoter", "promote", "-p", "uchiwa", "-c", "stable", "-v", "1.0.0", "-n", "1",
        ])
        .unwrap();

        match cli.command {
            Commands::Promote { release, channel, .. } => {
                assert_eq!(channel, Some(Channel::Stable));
                assert_eq!(release.project, Some(Project::Uchiwa));
                assert_eq!(release.project_version.as_deref(), Some("1.0.0"));
                assert_eq!(release.build_number.as_deref(), Some("1"));
                assert!(release.config.is_none());
            }
            _ => panic!("expected promote"),
        }
    }

    #[test]
    fn test_config_file_is_long_only() {
        let cli = Cli::try_parse_from([
            "package-promoter", "upload", "--config", "promote.yaml", "-c", "unstable",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload { release, channel } => {
                assert_eq!(release.config, Some(PathBuf::from("promote.yaml")));
                assert_eq!(channel, Some(Channel::Unstable));
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let err = Cli::try_parse_from(["package-promoter", "promote", "-c", "promote.yaml"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_json_requires_dry_run() {
        let err = Cli::try_parse_from(["package-promoter", "promote", "-v", "1.0.0", "-n", "1", "--json"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        assert!(
            Cli::try_parse_from([
                "package-promoter", "promote", "-v", "1.0.0", "-n", "1", "--dry-run", "--json",
            ])
            .is_ok()
        );
    }

    #[test]
    fn test_report_file_conflicts_with_dry_run() {
        let err = Cli::try_parse_from([
            "package-promoter", "promote", "--dry-run", "--report", "report.json",
        ])
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
