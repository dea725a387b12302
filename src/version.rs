/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Describe a single release of a package: timestamps,
    classification, constraints and its opaque payload.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    chrono for timestamp rendering.

  Operational Scope:
    Owned exclusively by a VersionList inside the Index.

  Revision History:
    2025-11-12 COD  Authored version entity and merge rules.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Identity fixed at construction
    - Merge mutates in place without reassigning identity
============================================================*/

use chrono::{DateTime, SecondsFormat, Utc};

use crate::merge::Merge;
use crate::payload::{same_payload, SharedPayload};
use crate::requires::RequireSet;

/// One release of a package, keyed by `(uid, version)`.
#[derive(Debug, Clone)]
pub struct Version {
    uid: String,
    version: String,
    pub(crate) time: i64,
    pub(crate) version_type: String,
    pub(crate) recommended: bool,
    pub(crate) volatile: bool,
    pub(crate) provides_recommendations: bool,
    pub(crate) requires: RequireSet,
    pub(crate) conflicts: RequireSet,
    pub(crate) data: Option<SharedPayload>,
}

impl Version {
    pub fn new(uid: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            version: version.into(),
            time: 0,
            version_type: String::new(),
            recommended: false,
            volatile: false,
            provides_recommendations: false,
            requires: RequireSet::new(),
            conflicts: RequireSet::new(),
            data: None,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Release time in seconds since the Unix epoch.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Release time rendered as RFC 3339 UTC, if representable.
    pub fn release_time(&self) -> Option<String> {
        DateTime::<Utc>::from_timestamp(self.time, 0)
            .map(|stamp| stamp.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn version_type(&self) -> &str {
        &self.version_type
    }

    /// Flag as declared by the document, regardless of eligibility.
    pub fn recommended_flag(&self) -> bool {
        self.recommended
    }

    /// Recommended and parsed as part of a package listing.
    pub fn is_recommended(&self) -> bool {
        self.provides_recommendations && self.recommended
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn provides_recommendations(&self) -> bool {
        self.provides_recommendations
    }

    /// Mark this version as parsed from a package listing.
    pub fn set_provides_recommendations(&mut self) {
        self.provides_recommendations = true;
    }

    pub fn requires(&self) -> &RequireSet {
        &self.requires
    }

    pub fn conflicts(&self) -> &RequireSet {
        &self.conflicts
    }

    pub fn data(&self) -> Option<&SharedPayload> {
        self.data.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Synthesized identity path of the standalone document.
    pub fn descriptor_path(&self) -> String {
        descriptor_path(&self.uid, &self.version)
    }

    /// Fold list-level metadata from a package listing into this version,
    /// keeping any payload already loaded.
    pub fn merge_from_list(&mut self, incoming: Version) {
        self.time = incoming.time;
        self.version_type = incoming.version_type;
        self.recommended = incoming.recommended;
        self.volatile = incoming.volatile;
        self.provides_recommendations = incoming.provides_recommendations;
        self.requires = incoming.requires;
        self.conflicts = incoming.conflicts;
    }
}

impl Merge for Version {
    fn merge(&mut self, incoming: Version) {
        self.version = incoming.version;
        self.time = incoming.time;
        self.version_type = incoming.version_type;
        self.recommended = incoming.recommended;
        self.volatile = incoming.volatile;
        self.requires = incoming.requires;
        self.conflicts = incoming.conflicts;
        self.data = incoming.data;
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.version == other.version
            && self.time == other.time
            && self.version_type == other.version_type
            && self.recommended == other.recommended
            && self.volatile == other.volatile
            && self.provides_recommendations == other.provides_recommendations
            && self.requires == other.requires
            && self.conflicts == other.conflicts
            && same_payload(&self.data, &other.data)
    }
}

pub fn descriptor_path(uid: &str, version: &str) -> String {
    format!("{uid}/{version}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RawVersionFile;
    use crate::requires::Requirement;
    use serde_json::json;
    use std::sync::Arc;

    fn listed(version: &str, time: i64) -> Version {
        let mut v = Version::new("net.minecraft", version);
        v.time = time;
        v.version_type = "release".into();
        v.recommended = true;
        v.set_provides_recommendations();
        v
    }

    #[test]
    fn merge_copies_every_field_but_uid() {
        let mut persistent = listed("1.20.1", 100);
        let mut incoming = Version::new("net.minecraft", "1.20.1");
        incoming.time = 200;
        incoming.version_type = "snapshot".into();
        incoming.volatile = true;
        incoming
            .requires
            .insert(Requirement::new("org.lwjgl3").suggests("3.3.1"));
        let payload: SharedPayload = Arc::new(RawVersionFile {
            path: incoming.descriptor_path(),
            requires_order: false,
            document: json!({}),
        });
        incoming.data = Some(payload.clone());

        persistent.merge(incoming);

        assert_eq!(persistent.uid(), "net.minecraft");
        assert_eq!(persistent.time(), 200);
        assert_eq!(persistent.version_type(), "snapshot");
        assert!(!persistent.recommended_flag());
        assert!(persistent.is_volatile());
        assert!(persistent.requires().contains("org.lwjgl3"));
        assert!(Arc::ptr_eq(persistent.data().unwrap(), &payload));
        // eligibility comes from the listing, not the standalone document
        assert!(persistent.provides_recommendations());
    }

    #[test]
    fn list_merge_keeps_loaded_payload() {
        let mut persistent = listed("1.20.1", 100);
        let payload: SharedPayload = Arc::new(RawVersionFile {
            path: persistent.descriptor_path(),
            requires_order: true,
            document: json!({ "mainClass": "net.minecraft.client.main.Main" }),
        });
        persistent.data = Some(payload.clone());

        let mut incoming = listed("1.20.1", 300);
        incoming.recommended = false;
        persistent.merge_from_list(incoming);

        assert_eq!(persistent.time(), 300);
        assert!(!persistent.is_recommended());
        assert!(Arc::ptr_eq(persistent.data().unwrap(), &payload));
    }

    #[test]
    fn recommendation_requires_eligibility() {
        let mut standalone = Version::new("net.minecraftforge", "36.2.0");
        standalone.recommended = true;
        assert!(!standalone.is_recommended());
        standalone.set_provides_recommendations();
        assert!(standalone.is_recommended());
    }

    #[test]
    fn renders_identity_and_time() {
        let v = listed("1.16.5", 1_610_000_000);
        assert_eq!(v.descriptor_path(), "net.minecraft/1.16.5.json");
        assert_eq!(v.release_time().as_deref(), Some("2021-01-07T06:13:20Z"));
    }
}
