/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::snapshot
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Encode the registry back into metadata documents, persist
    them as a directory tree, and read that tree back through
    the same gate, parse and merge entry points.

  Security / Safety Notes:
    Snapshot data is written to operator-controlled paths; no
    privileged operations are performed. Every uid and version
    label is checked before the first file is written.

  Dependencies:
    serde_json for documents, chrono for timestamps.

  Operational Scope:
    Reference storage collaborator for the syn-meta binary.

  Revision History:
    2025-11-12 COD  Adapted manifest writer into snapshot writer.
    2025-11-19 COD  Validate before writing; add snapshot reader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible snapshots
    - Encoded documents re-parse to equal entities
============================================================*/

use std::fs::{self, File};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::{MetaError, Result};
use crate::format::{CURRENT_FORMAT_VERSION, FORMAT_VERSION_KEY};
use crate::index::Index;
use crate::json::is_valid_identifier;
use crate::parse::{load_index, load_version, load_version_list};
use crate::payload::FormatLoader;
use crate::requires::{encode_requires, CONFLICTS_KEY, REQUIRES_KEY};
use crate::version::Version;
use crate::version_list::VersionList;

pub const INDEX_FILE: &str = "index.json";

/// Totals reported after a snapshot has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub generated_at: String,
    pub packages: usize,
    pub versions: usize,
    pub payloads: usize,
}

impl SnapshotSummary {
    pub fn of(index: &Index) -> Self {
        let versions = index.lists().map(VersionList::len).sum();
        let payloads = index
            .lists()
            .flat_map(VersionList::versions)
            .filter(|v| v.is_loaded())
            .count();
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            packages: index.len(),
            versions,
            payloads,
        }
    }
}

fn document_header() -> Map<String, Value> {
    let mut out = Map::new();
    out.insert(FORMAT_VERSION_KEY.into(), Value::from(CURRENT_FORMAT_VERSION));
    out
}

/// Encode the index document listing every package.
pub fn encode_index(index: &Index) -> Value {
    let mut out = document_header();
    let packages = index
        .lists()
        .map(|list| {
            let mut entry = Map::new();
            entry.insert("uid".into(), Value::String(list.uid().to_string()));
            if !list.name().is_empty() {
                entry.insert("name".into(), Value::String(list.name().to_string()));
            }
            Value::Object(entry)
        })
        .collect();
    out.insert("packages".into(), Value::Array(packages));
    Value::Object(out)
}

/// Encode a package document with its embedded version records.
pub fn encode_version_list(list: &VersionList) -> Value {
    let mut out = document_header();
    out.insert("uid".into(), Value::String(list.uid().to_string()));
    if !list.name().is_empty() {
        out.insert("name".into(), Value::String(list.name().to_string()));
    }
    let versions = list
        .versions()
        .iter()
        .map(|v| Value::Object(encode_version_record(v)))
        .collect();
    out.insert("versions".into(), Value::Array(versions));
    Value::Object(out)
}

/// Encode the list-level fields of one version.
pub fn encode_version_record(version: &Version) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("uid".into(), Value::String(version.uid().to_string()));
    out.insert("version".into(), Value::String(version.version().to_string()));
    if let Some(stamp) = version.release_time() {
        out.insert("releaseTime".into(), Value::String(stamp));
    }
    if !version.version_type().is_empty() {
        out.insert(
            "type".into(),
            Value::String(version.version_type().to_string()),
        );
    }
    if version.recommended_flag() {
        out.insert("recommended".into(), Value::Bool(true));
    }
    if version.is_volatile() {
        out.insert("volatile".into(), Value::Bool(true));
    }
    encode_requires(&mut out, version.requires(), REQUIRES_KEY);
    encode_requires(&mut out, version.conflicts(), CONFLICTS_KEY);
    out
}

/// Relative path of a package document.
pub fn package_path(uid: &str) -> String {
    format!("{uid}/{INDEX_FILE}")
}

/// Write the whole registry below `dir`. Nothing is written unless every
/// package uid and stored version label is a usable path component.
pub fn write_snapshot(index: &Index, dir: &Path) -> Result<SnapshotSummary> {
    for list in index.lists() {
        ensure_path_component(list.uid())?;
        for version in list.versions().iter().filter(|v| v.is_loaded()) {
            ensure_path_component(version.version())?;
        }
    }

    write_document(&dir.join(INDEX_FILE), &encode_index(index))?;
    for list in index.lists() {
        write_document(&dir.join(package_path(list.uid())), &encode_version_list(list))?;
        for version in list.versions() {
            let Some(document) = version.data().and_then(|data| data.to_document()) else {
                continue;
            };
            write_document(&dir.join(version.descriptor_path()), &document)?;
        }
    }
    Ok(SnapshotSummary::of(index))
}

/// Rebuild a registry from a snapshot written by [`write_snapshot`]. Every
/// listed package document must be present; version documents are loaded
/// only where a file exists.
pub fn read_snapshot(dir: &Path, loader: &dyn FormatLoader) -> Result<Index> {
    let mut index = Index::new();
    let document = read_document(dir, INDEX_FILE)?;
    load_index(&document, &mut index).map_err(|err| MetaError::parse(INDEX_FILE, err))?;

    let uids: Vec<String> = index.uids().map(str::to_string).collect();
    for uid in uids {
        let path = package_path(&uid);
        let document = read_document(dir, &path)?;
        let list = index.get_or_insert(&uid);
        load_version_list(&document, list).map_err(|err| MetaError::parse(&path, err))?;

        let stored: Vec<String> = list
            .versions()
            .iter()
            .filter(|v| dir.join(v.descriptor_path()).is_file())
            .map(|v| v.version().to_string())
            .collect();
        for label in stored {
            let Some(version) = list.get_mut(&label) else {
                continue;
            };
            let path = version.descriptor_path();
            let document = read_document(dir, &path)?;
            load_version(&document, version, loader).map_err(|err| MetaError::parse(&path, err))?;
        }
    }
    Ok(index)
}

fn ensure_path_component(value: &str) -> Result<()> {
    if !is_valid_identifier(value) {
        return Err(MetaError::Filesystem(format!(
            "Refusing to use `{value}` as a snapshot path component"
        )));
    }
    Ok(())
}

fn read_document(dir: &Path, relative: &str) -> Result<Value> {
    let path = dir.join(relative);
    let bytes = fs::read(&path).map_err(|err| {
        MetaError::Filesystem(format!("Failed to read snapshot file {}: {err}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        MetaError::Serialization(format!("{} is not valid JSON: {err}", path.display()))
    })
}

fn write_document(path: &Path, document: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            MetaError::Filesystem(format!(
                "Failed to create snapshot directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    let file = File::create(path).map_err(|err| {
        MetaError::Filesystem(format!(
            "Failed to create snapshot file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, document).map_err(|err| {
        MetaError::Serialization(format!(
            "Failed to write snapshot file {}: {err}",
            path.display()
        ))
    })?;
    Ok(())
}
