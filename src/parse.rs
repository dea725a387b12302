/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::parse
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Turn gated metadata documents into disconnected Index,
    VersionList and Version entities, and fold them into the
    caller's persistent registry.

  Security / Safety Notes:
    Documents come from an untrusted remote. Every field is
    type-checked and identity fields are mandatory; nothing is
    merged until the whole document has parsed.

  Dependencies:
    serde_json for document access, chrono for timestamps.

  Operational Scope:
    Parsing is pure and may run on any thread. The load_*
    entry points mutate persistent entities and must be
    serialised by the caller.

  Revision History:
    2025-11-12 COD  Authored entity parsers and load entry points.
    2025-11-19 COD  Validate identifiers; truncate stamps toward zero.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Parse fully, then merge
    - Lenient defaults only for descriptive fields
    - Explicit errors for every malformed identity
============================================================*/

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{ParseError, ParseResult};
use crate::format::require_known_format;
use crate::index::Index;
use crate::json::{
    as_object, optional_array, optional_bool, optional_str, required_identifier, required_str,
    Object,
};
use crate::merge::Merge;
use crate::payload::FormatLoader;
use crate::requires::{decode_requires, RequireSet, CONFLICTS_KEY, REQUIRES_KEY};
use crate::version::{descriptor_path, Version};
use crate::version_list::VersionList;

const RELEASE_TIME_KEY: &str = "releaseTime";
const ORDER_KEY: &str = "order";

/// Parse an index document into a transient [`Index`] of stub lists.
pub fn parse_index(document: &Value) -> ParseResult<Index> {
    let object = as_object(document, "index document")?;
    let stubs = optional_array(object, "packages")?
        .iter()
        .map(|entry| {
            let entry = as_object(entry, "packages")?;
            let mut list = VersionList::new(required_identifier(entry, "uid")?);
            list.set_name(optional_str(entry, "name")?);
            Ok(list)
        })
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(Index::from_lists(stubs))
}

/// Parse a package document into a transient, fully populated
/// [`VersionList`]. Every embedded version is eligible for recommendation.
pub fn parse_version_list(document: &Value) -> ParseResult<VersionList> {
    let object = as_object(document, "package document")?;
    let uid = required_identifier(object, "uid")?;
    let versions = optional_array(object, "versions")?
        .iter()
        .map(|entry| {
            let mut version = parse_common_version(&uid, as_object(entry, "versions")?)?;
            version.set_provides_recommendations();
            Ok(version)
        })
        .collect::<ParseResult<Vec<_>>>()?;

    let mut list = VersionList::new(uid);
    list.set_name(optional_str(object, "name")?);
    list.set_versions(versions);
    Ok(list)
}

/// Parse a standalone version document and resolve its payload through
/// `loader`.
pub fn parse_version(document: &Value, loader: &dyn FormatLoader) -> ParseResult<Version> {
    let object = as_object(document, "version document")?;
    let uid = required_identifier(object, "uid")?;
    let mut version = parse_common_version(&uid, object)?;
    let path = descriptor_path(version.uid(), version.version());
    let payload = loader.load(document, &path, object.contains_key(ORDER_KEY))?;
    version.data = Some(payload);
    Ok(version)
}

fn parse_common_version(uid: &str, object: &Object) -> ParseResult<Version> {
    let mut version = Version::new(uid, required_identifier(object, "version")?);
    version.time = parse_release_time(&required_str(object, RELEASE_TIME_KEY)?)?;
    version.version_type = optional_str(object, "type")?;
    version.recommended = optional_bool(object, "recommended")?;
    version.volatile = optional_bool(object, "volatile")?;
    version.requires = decode_constraints(uid, object, REQUIRES_KEY)?;
    version.conflicts = decode_constraints(uid, object, CONFLICTS_KEY)?;
    Ok(version)
}

fn decode_constraints(owner: &str, object: &Object, key: &str) -> ParseResult<RequireSet> {
    let set = decode_requires(object, key)?;
    if set.contains(owner) {
        return Err(ParseError::SelfRequirement {
            field: key.to_string(),
            uid: owner.to_string(),
        });
    }
    Ok(set)
}

/// Seconds since the epoch for an ISO-8601 stamp. Stamps without an offset
/// are read as UTC and a bare date means midnight. Sub-second precision is
/// truncated toward zero.
fn parse_release_time(raw: &str) -> ParseResult<i64> {
    let millis = DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.timestamp_millis())
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc().timestamp_millis())
        });
    millis
        .map(|millis| millis / 1000)
        .ok_or_else(|| ParseError::InvalidTimestamp {
            field: RELEASE_TIME_KEY.to_string(),
            value: raw.to_string(),
        })
}

/// Gate, parse and merge an index document into `index`.
pub fn load_index(document: &Value, index: &mut Index) -> ParseResult<()> {
    require_known_format(document)?;
    let incoming = parse_index(document)?;
    index.merge(incoming);
    Ok(())
}

/// Gate, parse and merge a package document into `list`.
pub fn load_version_list(document: &Value, list: &mut VersionList) -> ParseResult<()> {
    require_known_format(document)?;
    let incoming = parse_version_list(document)?;
    if incoming.uid() != list.uid() {
        return Err(ParseError::IdentityMismatch {
            expected: list.uid().to_string(),
            found: incoming.uid().to_string(),
        });
    }
    list.merge(incoming);
    Ok(())
}

/// Gate, parse and merge a standalone version document into `version`.
pub fn load_version(
    document: &Value,
    version: &mut Version,
    loader: &dyn FormatLoader,
) -> ParseResult<()> {
    require_known_format(document)?;
    let incoming = parse_version(document, loader)?;
    if incoming.uid() != version.uid() || incoming.version() != version.version() {
        return Err(ParseError::IdentityMismatch {
            expected: version.descriptor_path(),
            found: incoming.descriptor_path(),
        });
    }
    version.merge(incoming);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::payload::{RawDocumentLoader, RawVersionFile, SharedPayload};
    use crate::requires::Requirement;
    use serde_json::json;
    use std::cell::RefCell;
    use std::sync::Arc;

    fn forge_document() -> Value {
        json!({
            "formatVersion": 0,
            "uid": "net.minecraftforge",
            "version": "36.2.0",
            "releaseTime": "2021-06-01T00:00:00Z",
            "requires": [{ "uid": "net.minecraft", "equals": "1.16.5" }]
        })
    }

    #[test]
    fn parses_standalone_forge_version() {
        let version = parse_version(&forge_document(), &RawDocumentLoader).unwrap();

        assert_eq!(version.uid(), "net.minecraftforge");
        assert_eq!(version.version(), "36.2.0");
        assert_eq!(version.time(), 1_622_505_600);
        let expected: RequireSet = [Requirement::new("net.minecraft").equals("1.16.5")]
            .into_iter()
            .collect();
        assert_eq!(version.requires(), &expected);
        assert!(version.conflicts().is_empty());
        assert!(!version.provides_recommendations());
        assert!(version.is_loaded());
    }

    #[test]
    fn loader_receives_path_and_order_flag() {
        let seen = RefCell::new(None);
        let loader = |doc: &Value, path: &str, order: bool| -> ParseResult<SharedPayload> {
            *seen.borrow_mut() = Some((path.to_string(), order));
            Ok(Arc::new(RawVersionFile {
                path: path.to_string(),
                requires_order: order,
                document: doc.clone(),
            }))
        };

        parse_version(&forge_document(), &loader).unwrap();
        assert_eq!(
            seen.borrow().clone(),
            Some(("net.minecraftforge/36.2.0.json".to_string(), false))
        );

        let mut ordered = forge_document();
        ordered["order"] = json!(5);
        parse_version(&ordered, &loader).unwrap();
        assert_eq!(
            seen.borrow().clone(),
            Some(("net.minecraftforge/36.2.0.json".to_string(), true))
        );
    }

    #[test]
    fn packages_must_be_an_array() {
        let err = parse_index(&json!({ "formatVersion": 1, "packages": "net.minecraft" }))
            .unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Structural);
        assert_eq!(err.to_string(), "packages is not an array");
    }

    #[test]
    fn index_entries_become_stubs() {
        let index = parse_index(&json!({
            "formatVersion": 1,
            "packages": [
                { "uid": "net.minecraft", "name": "Minecraft", "sha256": "ab12" },
                { "uid": "org.lwjgl3" }
            ]
        }))
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("org.lwjgl3").map(VersionList::name), Some(""));
        assert!(index.lists().all(VersionList::is_empty));

        let missing = parse_index(&json!({ "packages": [{ "name": "Nameless" }] }));
        assert_eq!(missing.unwrap_err().kind(), ParseErrorKind::MissingField);
        assert!(parse_index(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn package_without_versions_is_empty() {
        let list = parse_version_list(&json!({ "formatVersion": 1, "uid": "net.minecraft" }))
            .unwrap();
        assert!(list.is_empty());
        assert_eq!(list.name(), "");

        let err = parse_version_list(&json!({ "uid": "net.minecraft", "versions": {} }))
            .unwrap_err();
        assert_eq!(err.to_string(), "versions is not an array");
    }

    #[test]
    fn listed_versions_use_list_uid_and_are_eligible() {
        let list = parse_version_list(&json!({
            "formatVersion": 1,
            "uid": "net.minecraft",
            "name": "Minecraft",
            "versions": [
                {
                    "version": "1.20.1",
                    "releaseTime": "2023-06-12T13:25:51+00:00",
                    "type": "release",
                    "recommended": true,
                    "requires": [{ "uid": "org.lwjgl3", "suggests": "3.3.1" }]
                },
                {
                    "version": "23w31a",
                    "releaseTime": "2023-08-01T12:00:00.750Z",
                    "type": "snapshot",
                    "volatile": true
                }
            ]
        }))
        .unwrap();

        assert_eq!(list.name(), "Minecraft");
        assert!(list.versions().iter().all(|v| v.uid() == "net.minecraft"));
        assert!(list.versions().iter().all(Version::provides_recommendations));
        assert_eq!(list.versions()[0].version(), "23w31a");
        assert_eq!(list.versions()[0].time(), 1_690_891_200);
        assert_eq!(list.recommended().map(Version::version), Some("1.20.1"));
        assert!(list.is_volatile());
        assert!(list.versions().iter().all(|v| !v.is_loaded()));
    }

    #[test]
    fn identity_fields_are_mandatory() {
        let mut doc = forge_document();
        doc.as_object_mut().unwrap().remove("releaseTime");
        assert_eq!(
            parse_version(&doc, &RawDocumentLoader).unwrap_err(),
            ParseError::missing("releaseTime")
        );

        let mut doc = forge_document();
        doc.as_object_mut().unwrap().remove("version");
        assert_eq!(
            parse_version(&doc, &RawDocumentLoader).unwrap_err().kind(),
            ParseErrorKind::MissingField
        );

        let mut doc = forge_document();
        doc["requires"] = json!([{ "equals": "1.16.5" }]);
        assert_eq!(
            parse_version(&doc, &RawDocumentLoader).unwrap_err(),
            ParseError::missing("uid")
        );
    }

    #[test]
    fn timestamps_are_validated() {
        assert_eq!(parse_release_time("2021-06-01T00:00:00Z"), Ok(1_622_505_600));
        assert_eq!(parse_release_time("2021-06-01T02:00:00+02:00"), Ok(1_622_505_600));
        assert_eq!(parse_release_time("2021-06-01T00:00:00"), Ok(1_622_505_600));
        assert_eq!(parse_release_time("2021-06-01T00:00:00.999Z"), Ok(1_622_505_600));
        assert_eq!(parse_release_time("2021-06-01"), Ok(1_622_505_600));
        assert_eq!(parse_release_time("1969-12-31T23:59:59.500Z"), Ok(0));
        assert_eq!(parse_release_time("1969-12-31T23:59:58.250Z"), Ok(-1));
        assert!(matches!(
            parse_release_time("yesterday"),
            Err(ParseError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn identifiers_are_validated_everywhere() {
        let empty = parse_index(&json!({ "packages": [{ "uid": "" }] }));
        assert_eq!(empty.unwrap_err(), ParseError::missing("uid"));

        let escape = parse_index(&json!({ "packages": [{ "uid": "../escape" }] }));
        assert_eq!(escape.unwrap_err().kind(), ParseErrorKind::Structural);

        let list = parse_version_list(&json!({ "uid": "..", "versions": [] }));
        assert!(matches!(list, Err(ParseError::InvalidIdentifier { .. })));

        let label = parse_version_list(&json!({
            "uid": "net.minecraft",
            "versions": [{ "version": "1.20/../../x", "releaseTime": "2023-06-12T13:25:51Z" }]
        }));
        assert_eq!(
            label.unwrap_err().to_string(),
            "version `1.20/../../x` is not a valid identifier"
        );

        let mut doc = forge_document();
        doc["uid"] = json!("net\\minecraftforge");
        assert!(matches!(
            parse_version(&doc, &RawDocumentLoader),
            Err(ParseError::InvalidIdentifier { .. })
        ));

        let mut doc = forge_document();
        doc["version"] = json!("");
        assert_eq!(
            parse_version(&doc, &RawDocumentLoader).unwrap_err(),
            ParseError::missing("version")
        );
    }

    #[test]
    fn self_constraints_are_rejected() {
        let mut doc = forge_document();
        doc["conflicts"] = json!([{ "uid": "net.minecraftforge" }]);
        assert_eq!(
            parse_version(&doc, &RawDocumentLoader).unwrap_err().to_string(),
            "conflicts entry targets its own package net.minecraftforge"
        );
    }

    #[test]
    fn wrong_typed_descriptive_fields_fail() {
        let mut doc = forge_document();
        doc["type"] = json!(7);
        assert_eq!(
            parse_version(&doc, &RawDocumentLoader).unwrap_err(),
            ParseError::wrong_type("type", "a string")
        );
        assert!(parse_version(&json!([]), &RawDocumentLoader).is_err());
    }

    #[test]
    fn unknown_format_leaves_index_untouched() {
        let mut index = Index::new();
        load_index(
            &json!({ "formatVersion": 1, "packages": [{ "uid": "net.minecraft" }] }),
            &mut index,
        )
        .unwrap();
        let before = index.clone();

        let err = load_index(
            &json!({ "formatVersion": 2, "packages": [{ "uid": "org.lwjgl" }] }),
            &mut index,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown format version");
        assert_eq!(index, before);

        let err = load_index(&json!({ "packages": [] }), &mut index).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Schema);
    }

    #[test]
    fn malformed_package_leaves_list_untouched() {
        let mut list = VersionList::new("net.minecraft");
        load_version_list(
            &json!({
                "formatVersion": 1,
                "uid": "net.minecraft",
                "name": "Minecraft",
                "versions": [{ "version": "1.20.1", "releaseTime": "2023-06-12T13:25:51Z" }]
            }),
            &mut list,
        )
        .unwrap();
        let before = list.clone();

        let result = load_version_list(
            &json!({
                "formatVersion": 1,
                "uid": "net.minecraft",
                "versions": [
                    { "version": "1.20.2", "releaseTime": "2023-09-21T12:00:00Z" },
                    { "version": "1.20.3" }
                ]
            }),
            &mut list,
        );
        assert!(result.is_err());
        assert_eq!(list, before);

        let mismatch = load_version_list(
            &json!({ "formatVersion": 1, "uid": "org.lwjgl3" }),
            &mut list,
        );
        assert!(matches!(mismatch, Err(ParseError::IdentityMismatch { .. })));
        assert_eq!(list, before);
    }

    #[test]
    fn load_version_merges_matching_identity() {
        let mut version = Version::new("net.minecraftforge", "36.2.0");
        load_version(&forge_document(), &mut version, &RawDocumentLoader).unwrap();
        assert_eq!(version.time(), 1_622_505_600);
        assert!(version.is_loaded());

        let mut other = Version::new("net.minecraftforge", "36.1.0");
        let err = load_version(&forge_document(), &mut other, &RawDocumentLoader).unwrap_err();
        assert_eq!(
            err.to_string(),
            "document for net.minecraftforge/36.2.0.json cannot be merged into net.minecraftforge/36.1.0.json"
        );
        assert!(!other.is_loaded());
    }
}
