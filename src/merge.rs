/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::merge
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    In-place absorption of freshly parsed entities into the
    persistent ones held by the registry.

  Security / Safety Notes:
    Pure in-memory mutation; no I/O performed in this module.

  Dependencies:
    None.

  Operational Scope:
    Called by the load entry points once a document has been
    gated and fully parsed.

  Revision History:
    2025-11-12 COD  Authored merge capability.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Parse fully, then merge
    - Merging never fails
============================================================*/

/// Implemented by [`Index`](crate::index::Index),
/// [`VersionList`](crate::version_list::VersionList) and
/// [`Version`](crate::version::Version).
///
/// `incoming` must be a fully parsed entity with the same identity as
/// `self`; merging never fails.
pub trait Merge {
    fn merge(&mut self, incoming: Self);
}
