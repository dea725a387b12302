/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::format
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Gate metadata documents on their declared schema epoch
    before any structural parsing takes place.

  Security / Safety Notes:
    Inspects a single top-level key; never walks the rest of
    an untrusted document.

  Dependencies:
    serde_json for document access.

  Operational Scope:
    Called by every top-level load entry point.

  Revision History:
    2025-11-12 COD  Introduced formatVersion gate.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Reject unknown schema epochs instead of guessing
    - No partial parses of unsupported documents
============================================================*/

use serde_json::Value;

use crate::error::{ParseError, ParseResult};

pub const FORMAT_VERSION_KEY: &str = "formatVersion";

/// formatVersion written by the encoders in this crate.
pub const CURRENT_FORMAT_VERSION: i64 = 1;

/// Schema epochs understood by the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataVersion {
    /// formatVersion 0 or 1.
    InitialRelease,
    Invalid,
}

/// Determine the schema epoch of `document`.
///
/// An absent key is accepted only when `required` is false. A present key
/// must be an integer literal; `1.0` or `"1"` are rejected.
pub fn parse_format_version(document: &Value, required: bool) -> MetadataVersion {
    let Some(raw) = document.get(FORMAT_VERSION_KEY) else {
        return if required {
            MetadataVersion::Invalid
        } else {
            MetadataVersion::InitialRelease
        };
    };

    let number = match raw {
        Value::Number(number) if number.is_i64() || number.is_u64() => number,
        _ => return MetadataVersion::Invalid,
    };

    match number.as_i64() {
        Some(0) | Some(1) => MetadataVersion::InitialRelease,
        _ => MetadataVersion::Invalid,
    }
}

/// Gate a top-level document, failing with the schema error when the epoch
/// is not understood.
pub fn require_known_format(document: &Value) -> ParseResult<MetadataVersion> {
    match parse_format_version(document, true) {
        MetadataVersion::Invalid => Err(ParseError::UnknownFormatVersion),
        known => Ok(known),
    }
}
