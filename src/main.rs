/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for syn-meta. Restores the previous registry
    snapshot, folds freshly fetched metadata documents into
    it, and writes the refreshed snapshot back.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTPS GET
    requests or local file reads, and writes only below the
    configured snapshot and log directories.

  Dependencies:
    clap for CLI parsing, chrono for session stamps.

  Operational Scope:
    Invoked by operators or timers to keep a local metadata
    mirror current.

  Revision History:
    2025-11-12 COD  Authored syn-meta runtime.
    2025-11-19 COD  Restore through the snapshot reader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use synmeta_core::config::MetaConfig;
use synmeta_core::error::{MetaError, Result};
use synmeta_core::logger::Logger;
use synmeta_core::snapshot::{read_snapshot, write_snapshot, SnapshotSummary, INDEX_FILE};
use synmeta_core::source::DocumentSource;
use synmeta_core::sync::{sync_registry, SyncOptions, SyncReport};
use synmeta_core::{Index, RawDocumentLoader};

/// Command-line arguments for syn-meta.
#[derive(Debug, Parser)]
#[command(
    name = "syn-meta",
    version,
    author = "Synavera Systems",
    about = "Incremental launcher metadata mirror"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Metadata origin: an http(s) base URL or a local directory.
    #[arg(long, value_name = "URL|DIR")]
    source: Option<String>,
    /// Override snapshot directory.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Limit the refresh to specific package uids.
    #[arg(long = "package", value_name = "UID", action = ArgAction::Append)]
    packages: Vec<String>,
    /// Also load standalone version documents.
    #[arg(long, action = ArgAction::SetTrue)]
    with_versions: bool,
    /// Do not write the snapshot; emit summary only.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[syn-meta] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = MetaConfig::load_from_optional_path(cli.config.as_deref())?;
    if let Some(origin) = &cli.source {
        apply_source_override(&mut config, origin);
    }

    let snapshot_dir = cli.snapshot.clone().unwrap_or_else(|| config.snapshot_dir());

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("sync_{session_stamp}.log")));
    let logger = Logger::new(Some(log_path), cli.verbose)?;
    logger.info("INIT", "Syn-Meta awakening.");

    let loader = RawDocumentLoader;
    let mut index = restore_snapshot(&snapshot_dir, &loader, &logger);

    let source = DocumentSource::from_config(&config.source)?;
    logger.info("SOURCE", format!("Fetching metadata from {}", source.describe()));

    let options = SyncOptions {
        packages: cli.packages.clone(),
        with_versions: cli.with_versions,
        max_parallel_requests: config.source.max_parallel_requests,
    };
    let report = sync_registry(&mut index, &source, &options, &loader, &logger).await?;

    let summary = if cli.dry_run {
        SnapshotSummary::of(&index)
    } else {
        let summary = write_snapshot(&index, &snapshot_dir)?;
        logger.info(
            "SNAPSHOT",
            format!("Snapshot written to {}", snapshot_dir.display()),
        );
        summary
    };
    print_summary(&summary, &report, cli.dry_run);

    logger.info("COMPLETE", "Metadata synchronised.");
    logger.finalize()?;

    if report.packages_failed > 0 || report.versions_failed > 0 {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn apply_source_override(config: &mut MetaConfig, origin: &str) {
    if origin.starts_with("http://") || origin.starts_with("https://") {
        config.source.base_url = origin.to_string();
        config.source.directory = None;
    } else {
        config.source.directory = Some(PathBuf::from(origin));
    }
}

/// Rebuild the registry from a previous snapshot. A missing or unreadable
/// snapshot starts an empty registry.
fn restore_snapshot(dir: &Path, loader: &RawDocumentLoader, logger: &Logger) -> Index {
    if !dir.join(INDEX_FILE).exists() {
        logger.info("SNAPSHOT", "No previous snapshot; starting empty registry");
        return Index::new();
    }

    match read_snapshot(dir, loader) {
        Ok(index) => {
            let restored = SnapshotSummary::of(&index);
            logger.info(
                "SNAPSHOT",
                format!(
                    "Restored {} packages ({} version payloads)",
                    restored.packages, restored.payloads
                ),
            );
            index
        }
        Err(err) => {
            log_restore_failure(logger, &err);
            Index::new()
        }
    }
}

fn log_restore_failure(logger: &Logger, err: &MetaError) {
    logger.warn(
        "SNAPSHOT",
        format!("Discarding unreadable snapshot: {err}"),
    );
}

fn print_summary(summary: &SnapshotSummary, report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "→ Sync dry-run." } else { "→ Sync complete." };
    println!(
        "{prefix} Packages={} Versions={} Payloads={} (refreshed={} failed={})",
        summary.packages,
        summary.versions,
        summary.payloads,
        report.packages_refreshed,
        report.packages_failed
    );
}
