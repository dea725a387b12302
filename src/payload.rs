/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::payload
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Define the injected capability that resolves a standalone
    version document into its opaque launch/build payload.

  Security / Safety Notes:
    Loaders receive the full untrusted document; the default
    loader only retains it and never interprets its contents.

  Dependencies:
    serde_json for document access.

  Operational Scope:
    Supplied by callers of load_version/parse_version.

  Revision History:
    2025-11-12 COD  Introduced payload loader seam.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Payload schema kept outside the metadata core
============================================================*/

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ParseResult;

/// Opaque per-version data produced by a [`FormatLoader`].
pub trait VersionPayload: Debug + Send + Sync {
    /// Document form used when the registry is persisted. Payloads that
    /// cannot be re-encoded are skipped by the snapshot writer.
    fn to_document(&self) -> Option<Value> {
        None
    }
}

pub type SharedPayload = Arc<dyn VersionPayload>;

/// Resolves a version document into its payload.
pub trait FormatLoader {
    /// `path` is the synthesized identity `<uid>/<version>.json`;
    /// `requires_order` reports whether the document declares `order`.
    fn load(&self, document: &Value, path: &str, requires_order: bool)
        -> ParseResult<SharedPayload>;
}

impl<F> FormatLoader for F
where
    F: Fn(&Value, &str, bool) -> ParseResult<SharedPayload>,
{
    fn load(
        &self,
        document: &Value,
        path: &str,
        requires_order: bool,
    ) -> ParseResult<SharedPayload> {
        self(document, path, requires_order)
    }
}

/// Payload that keeps the version document verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVersionFile {
    pub path: String,
    pub requires_order: bool,
    pub document: Value,
}

impl VersionPayload for RawVersionFile {
    fn to_document(&self) -> Option<Value> {
        Some(self.document.clone())
    }
}

/// Loader producing [`RawVersionFile`] payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDocumentLoader;

impl FormatLoader for RawDocumentLoader {
    fn load(
        &self,
        document: &Value,
        path: &str,
        requires_order: bool,
    ) -> ParseResult<SharedPayload> {
        Ok(Arc::new(RawVersionFile {
            path: path.to_string(),
            requires_order,
            document: document.clone(),
        }))
    }
}

/// Compare payload identity rather than contents.
pub(crate) fn same_payload(left: &Option<SharedPayload>, right: &Option<SharedPayload>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}
