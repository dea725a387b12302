/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::index
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Top-level registry mapping package uid to its VersionList.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    None beyond std.

  Operational Scope:
    Lives for the registry's lifetime; mutated only through
    merges of parsed index stubs and package documents.

  Revision History:
    2025-11-12 COD  Authored registry index.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible snapshots
    - Strict tree ownership, lookups by uid only
============================================================*/

use std::collections::btree_map::{BTreeMap, Entry};

use crate::merge::Merge;
use crate::version_list::VersionList;

/// Registry of packages keyed by uid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    lists: BTreeMap<String, VersionList>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from lists; a later list replaces an earlier one
    /// with the same uid.
    pub fn from_lists(lists: impl IntoIterator<Item = VersionList>) -> Self {
        let lists = lists
            .into_iter()
            .map(|list| (list.uid().to_string(), list))
            .collect();
        Self { lists }
    }

    pub fn get(&self, uid: &str) -> Option<&VersionList> {
        self.lists.get(uid)
    }

    pub fn get_mut(&mut self, uid: &str) -> Option<&mut VersionList> {
        self.lists.get_mut(uid)
    }

    /// Persistent list for `uid`, created as an empty stub when unknown.
    pub fn get_or_insert(&mut self, uid: &str) -> &mut VersionList {
        self.lists
            .entry(uid.to_string())
            .or_insert_with(|| VersionList::new(uid))
    }

    pub fn has_uid(&self, uid: &str) -> bool {
        self.lists.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Lists in uid order.
    pub fn lists(&self) -> impl Iterator<Item = &VersionList> {
        self.lists.values()
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }
}

impl Merge for Index {
    /// Add unknown packages; refresh only the name of known ones.
    fn merge(&mut self, incoming: Index) {
        for (uid, list) in incoming.lists {
            match self.lists.entry(uid) {
                Entry::Occupied(mut known) => known.get_mut().set_name(list.name()),
                Entry::Vacant(slot) => {
                    slot.insert(list);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn stub(uid: &str, name: &str) -> VersionList {
        let mut list = VersionList::new(uid);
        list.set_name(name);
        list
    }

    #[test]
    fn merge_adds_new_and_renames_known() {
        let mut persistent = Index::new();
        let mut populated = stub("net.minecraft", "Minecraft");
        populated.set_versions(vec![Version::new("net.minecraft", "1.20.1")]);
        persistent.merge(Index::from_lists([populated]));

        persistent.merge(Index::from_lists([
            stub("net.minecraft", "Minecraft: Java Edition"),
            stub("org.lwjgl3", "LWJGL 3"),
        ]));

        assert_eq!(persistent.len(), 2);
        let minecraft = persistent.get("net.minecraft").unwrap();
        assert_eq!(minecraft.name(), "Minecraft: Java Edition");
        assert_eq!(minecraft.len(), 1, "name refresh must not touch versions");
        assert!(persistent.has_uid("org.lwjgl3"));
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let incoming = Index::from_lists([
            stub("net.minecraft", "Minecraft"),
            stub("net.minecraftforge", "Forge"),
        ]);
        let mut once = Index::new();
        once.merge(incoming.clone());
        let mut twice = once.clone();
        twice.merge(incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicate_uids_collapse() {
        let index = Index::from_lists([stub("net.minecraft", "A"), stub("net.minecraft", "B")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("net.minecraft").map(VersionList::name), Some("B"));
    }

    #[test]
    fn get_or_insert_creates_stub() {
        let mut index = Index::new();
        index.get_or_insert("com.mumfrey.liteloader").set_name("LiteLoader");
        assert_eq!(
            index.uids().collect::<Vec<_>>(),
            vec!["com.mumfrey.liteloader"]
        );
        assert_eq!(index.get_or_insert("com.mumfrey.liteloader").name(), "LiteLoader");
    }
}
