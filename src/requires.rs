/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::requires
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Represent inter-package requirement and conflict
    constraints, and convert them to and from the nested
    "requires"/"conflicts" wire arrays.

  Security / Safety Notes:
    Pure data conversion; no I/O performed in this module.

  Dependencies:
    serde_json for document access.

  Operational Scope:
    Used by the version parser and by the snapshot encoders.

  Revision History:
    2025-11-12 COD  Authored requirement set codec.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Absent field is the only encoding of an empty set
    - Deterministic ordering for reproducible output
============================================================*/

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ParseError, ParseResult};
use crate::json::{as_object, optional_array, optional_str, required_str};

pub const REQUIRES_KEY: &str = "requires";
pub const CONFLICTS_KEY: &str = "conflicts";

/// A constraint on another package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Requirement {
    pub uid: String,
    /// Exact version pin; empty when unconstrained.
    pub equals: String,
    /// Suggested version hint; empty when absent.
    pub suggests: String,
}

impl Requirement {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            equals: String::new(),
            suggests: String::new(),
        }
    }

    pub fn equals(mut self, version: impl Into<String>) -> Self {
        self.equals = version.into();
        self
    }

    pub fn suggests(mut self, version: impl Into<String>) -> Self {
        self.suggests = version.into();
        self
    }
}

/// Set of requirements keyed by target uid. Inserting a second requirement
/// for the same target replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequireSet {
    entries: BTreeMap<String, Requirement>,
}

impl RequireSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a requirement, returning the one it replaced.
    pub fn insert(&mut self, requirement: Requirement) -> Option<Requirement> {
        self.entries.insert(requirement.uid.clone(), requirement)
    }

    pub fn get(&self, uid: &str) -> Option<&Requirement> {
        self.entries.get(uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requirements in target uid order.
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.values()
    }
}

impl FromIterator<Requirement> for RequireSet {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        let mut set = RequireSet::new();
        for requirement in iter {
            set.insert(requirement);
        }
        set
    }
}

/// Decode the requirement array stored under `key`.
pub fn decode_requires(object: &Map<String, Value>, key: &str) -> ParseResult<RequireSet> {
    let mut set = RequireSet::new();
    for entry in optional_array(object, key)? {
        let entry = as_object(entry, key)?;
        let uid = required_str(entry, "uid")?;
        if uid.is_empty() {
            return Err(ParseError::missing(format!("{key}.uid")));
        }
        set.insert(Requirement {
            uid,
            equals: optional_str(entry, "equals")?,
            suggests: optional_str(entry, "suggests")?,
        });
    }
    Ok(set)
}

/// Encode `set` under `key`. An empty set leaves `object` untouched.
pub fn encode_requires(object: &mut Map<String, Value>, set: &RequireSet, key: &str) {
    if set.is_empty() {
        return;
    }
    let entries = set
        .iter()
        .map(|requirement| {
            let mut out = Map::new();
            out.insert("uid".into(), Value::String(requirement.uid.clone()));
            if !requirement.equals.is_empty() {
                out.insert("equals".into(), Value::String(requirement.equals.clone()));
            }
            if !requirement.suggests.is_empty() {
                out.insert(
                    "suggests".into(),
                    Value::String(requirement.suggests.clone()),
                );
            }
            Value::Object(out)
        })
        .collect();
    object.insert(key.to_string(), Value::Array(entries));
}
