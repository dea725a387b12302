/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Schema-versioned ingestion and merge engine for launcher
    package metadata: gate documents on formatVersion, parse
    them into Index / VersionList / Version entities, and fold
    them into a persistent registry without rebuilding it.

  Security / Safety Notes:
    Documents are untrusted. Parsing is pure and total; merges
    happen only after a document has parsed completely.

  Dependencies:
    serde_json for documents, chrono for timestamps, thiserror
    for errors; tokio/reqwest for the reference fetcher.

  Operational Scope:
    Library consumed by the syn-meta binary and by any caller
    owning a metadata registry.

  Revision History:
    2025-11-12 COD  Established Syn-Meta core library.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling
    - Strict tree ownership of registry entities
    - Explicit seams for payload loading and I/O
============================================================*/

pub mod config;
pub mod error;
pub mod format;
pub mod index;
mod json;
pub mod logger;
pub mod merge;
pub mod parse;
pub mod payload;
pub mod requires;
pub mod snapshot;
pub mod source;
pub mod sync;
pub mod version;
pub mod version_list;

pub use error::{MetaError, ParseError, ParseErrorKind, ParseResult, Result};
pub use format::{parse_format_version, MetadataVersion};
pub use index::Index;
pub use merge::Merge;
pub use parse::{
    load_index, load_version, load_version_list, parse_index, parse_version, parse_version_list,
};
pub use payload::{FormatLoader, RawDocumentLoader, RawVersionFile, SharedPayload, VersionPayload};
pub use requires::{decode_requires, encode_requires, RequireSet, Requirement};
pub use version::Version;
pub use version_list::VersionList;
