/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::version_list
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Hold every known version of one package, newest first,
    and absorb fresh package listings as snapshots.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    None beyond std.

  Operational Scope:
    Owned exclusively by the Index; created as a nameless stub
    from the index document or fully populated from a package
    document.

  Revision History:
    2025-11-12 COD  Authored package entity and snapshot merge.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Snapshot replace, never per-item drift
    - Loaded payloads survive listing refreshes
============================================================*/

use std::collections::HashMap;

use crate::merge::Merge;
use crate::version::Version;

/// All known versions sharing one package uid.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionList {
    uid: String,
    name: String,
    versions: Vec<Version>,
}

impl VersionList {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: String::new(),
            versions: Vec::new(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Versions ordered newest first.
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Replace the version sequence. Versions are re-sorted newest first;
    /// ties keep their document order.
    pub fn set_versions(&mut self, mut versions: Vec<Version>) {
        versions.sort_by(|a, b| b.time().cmp(&a.time()));
        self.versions = versions;
    }

    pub fn get(&self, version: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.version() == version)
    }

    pub fn get_mut(&mut self, version: &str) -> Option<&mut Version> {
        self.versions.iter_mut().find(|v| v.version() == version)
    }

    /// Newest version that is recommended by the listing.
    pub fn recommended(&self) -> Option<&Version> {
        self.versions.iter().find(|v| v.is_recommended())
    }

    pub fn has_recommended(&self) -> bool {
        self.recommended().is_some()
    }

    pub fn is_volatile(&self) -> bool {
        self.versions.iter().any(Version::is_volatile)
    }

    /// Newest version classified as `release`.
    pub fn latest_release(&self) -> Option<&Version> {
        self.versions.iter().find(|v| v.version_type() == "release")
    }
}

impl Merge for VersionList {
    /// Adopt the name and the full version sequence of `incoming`. Versions
    /// already known by label keep their loaded payload; versions missing
    /// from `incoming` are dropped.
    fn merge(&mut self, incoming: VersionList) {
        self.name = incoming.name;

        let mut existing: HashMap<String, Version> = self
            .versions
            .drain(..)
            .map(|v| (v.version().to_string(), v))
            .collect();

        let merged = incoming
            .versions
            .into_iter()
            .map(|fresh| match existing.remove(fresh.version()) {
                Some(mut known) => {
                    known.merge_from_list(fresh);
                    known
                }
                None => fresh,
            })
            .collect();
        self.set_versions(merged);
    }
}
