/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::sync
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Refresh the registry from a document source: index first,
    then package listings, then optionally standalone version
    documents.

  Security / Safety Notes:
    A malformed or unreachable document only abandons that
    document's update; prior registry state for it is kept.

  Dependencies:
    tokio (through DocumentSource) for concurrent fetches.

  Operational Scope:
    Fetches run concurrently; every merge happens on the
    calling task, which holds the only &mut to the Index.

  Revision History:
    2025-11-12 COD  Authored registry sync orchestration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Parse fully, then merge
    - Structured logging following Synavera cadence
    - Per-document failure isolation
============================================================*/

use std::collections::BTreeSet;

use crate::error::{MetaError, Result};
use crate::index::Index;
use crate::logger::Logger;
use crate::parse::{load_index, load_version, load_version_list};
use crate::payload::FormatLoader;
use crate::snapshot::{package_path, INDEX_FILE};
use crate::source::DocumentSource;

/// What a sync should refresh.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Package uids to refresh; empty means every package in the index.
    pub packages: Vec<String>,
    /// Also load standalone version documents for refreshed packages.
    pub with_versions: bool,
    pub max_parallel_requests: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            with_versions: false,
            max_parallel_requests: 4,
        }
    }
}

/// Outcome counters for one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub packages_refreshed: usize,
    pub packages_failed: usize,
    pub versions_loaded: usize,
    pub versions_failed: usize,
}

/// Refresh `index` from `source`.
///
/// Failure to load the index document is fatal; failures of individual
/// package or version documents are logged and counted.
pub async fn sync_registry(
    index: &mut Index,
    source: &DocumentSource,
    options: &SyncOptions,
    loader: &dyn FormatLoader,
    logger: &Logger,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    let document = source.fetch(INDEX_FILE).await?;
    load_index(&document, index).map_err(|err| MetaError::parse(INDEX_FILE, err))?;
    logger.info("INDEX", format!("Index lists {} packages", index.len()));

    let selected = select_packages(index, &options.packages, logger);
    let paths = selected.iter().map(|uid| package_path(uid)).collect();
    let fetched = source
        .fetch_many(paths, options.max_parallel_requests)
        .await?;

    let mut refreshed = Vec::new();
    for (uid, (path, outcome)) in selected.into_iter().zip(fetched) {
        let merged = outcome.and_then(|document| {
            let list = index.get_or_insert(&uid);
            load_version_list(&document, list).map_err(|err| MetaError::parse(&path, err))
        });
        match merged {
            Ok(()) => {
                report.packages_refreshed += 1;
                refreshed.push(uid);
            }
            Err(err) => {
                report.packages_failed += 1;
                logger.warn("PACKAGE", format!("Skipping {uid}: {err}"));
            }
        }
    }

    if options.with_versions {
        for uid in &refreshed {
            load_versions(index, uid, source, options, loader, logger, &mut report).await?;
        }
    }

    logger.info(
        "SYNC",
        format!(
            "packages refreshed={} failed={} versions loaded={} failed={}",
            report.packages_refreshed,
            report.packages_failed,
            report.versions_loaded,
            report.versions_failed
        ),
    );
    Ok(report)
}

async fn load_versions(
    index: &mut Index,
    uid: &str,
    source: &DocumentSource,
    options: &SyncOptions,
    loader: &dyn FormatLoader,
    logger: &Logger,
    report: &mut SyncReport,
) -> Result<()> {
    let Some(list) = index.get(uid) else {
        return Ok(());
    };
    let labels: Vec<String> = list.versions().iter().map(|v| v.version().to_string()).collect();
    let paths = list.versions().iter().map(|v| v.descriptor_path()).collect();
    let fetched = source
        .fetch_many(paths, options.max_parallel_requests)
        .await?;

    for (label, (path, outcome)) in labels.into_iter().zip(fetched) {
        let merged = outcome.and_then(|document| {
            match index.get_mut(uid).and_then(|list| list.get_mut(&label)) {
                Some(version) => load_version(&document, version, loader)
                    .map_err(|err| MetaError::parse(&path, err)),
                None => Err(MetaError::Runtime(format!("{path} vanished during sync"))),
            }
        });
        match merged {
            Ok(()) => report.versions_loaded += 1,
            Err(err) => {
                report.versions_failed += 1;
                logger.warn("VERSION", format!("Skipping {path}: {err}"));
            }
        }
    }
    Ok(())
}

fn select_packages(index: &Index, requested: &[String], logger: &Logger) -> Vec<String> {
    if requested.is_empty() {
        return index.uids().map(str::to_string).collect();
    }

    let requested: BTreeSet<&str> = requested.iter().map(String::as_str).collect();
    let missing: Vec<&str> = requested
        .iter()
        .copied()
        .filter(|uid| !index.has_uid(uid))
        .collect();
    if !missing.is_empty() {
        logger.warn(
            "PKG404",
            format!("Requested packages not in index: {}", missing.join(", ")),
        );
    }

    requested
        .into_iter()
        .filter(|uid| index.has_uid(uid))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version_list::VersionList;

    #[test]
    fn selection_defaults_to_every_package() {
        let index = Index::from_lists([
            VersionList::new("net.minecraft"),
            VersionList::new("org.lwjgl3"),
        ]);
        let logger = Logger::disabled();
        assert_eq!(
            select_packages(&index, &[], &logger),
            ["net.minecraft", "org.lwjgl3"]
        );
    }

    #[test]
    fn selection_drops_unknown_packages() {
        let index = Index::from_lists([VersionList::new("net.minecraft")]);
        let logger = Logger::disabled();
        let requested = vec!["net.minecraft".to_string(), "com.example.ghost".to_string()];
        assert_eq!(
            select_packages(&index, &requested, &logger),
            ["net.minecraft"]
        );
    }
}
