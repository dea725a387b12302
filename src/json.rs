/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::json
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Typed field access over loosely-typed metadata documents.
    Absent optional fields fall back to defaults; present
    fields with the wrong JSON type are always errors.

  Security / Safety Notes:
    Package uids and version labels double as path segments
    for sources and snapshots; they are validated here before
    any entity is built from them.

  Dependencies:
    serde_json for document access.

  Operational Scope:
    Internal helpers for the parsers and requirement codec.

  Revision History:
    2025-11-12 COD  Authored typed field helpers.
    2025-11-19 COD  Validate identifiers used as path segments.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Lenient defaults only for descriptive fields
    - Untrusted identifiers never reach the filesystem raw
============================================================*/

use serde_json::{Map, Value};

use crate::error::{ParseError, ParseResult};

pub(crate) type Object = Map<String, Value>;

pub(crate) fn as_object<'a>(value: &'a Value, context: &str) -> ParseResult<&'a Object> {
    value
        .as_object()
        .ok_or_else(|| ParseError::wrong_type(context, "an object"))
}

pub(crate) fn required_str(object: &Object, key: &str) -> ParseResult<String> {
    match object.get(key) {
        None | Some(Value::Null) => Err(ParseError::missing(key)),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ParseError::wrong_type(key, "a string")),
    }
}

/// Whether `value` is usable as a single path segment: non-empty, not a
/// dot segment, no separators.
pub(crate) fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\'])
}

/// A package uid or version label. Empty counts as missing.
pub(crate) fn required_identifier(object: &Object, key: &str) -> ParseResult<String> {
    let value = required_str(object, key)?;
    if value.is_empty() {
        return Err(ParseError::missing(key));
    }
    if !is_valid_identifier(&value) {
        return Err(ParseError::InvalidIdentifier {
            field: key.to_string(),
            value,
        });
    }
    Ok(value)
}

pub(crate) fn optional_str(object: &Object, key: &str) -> ParseResult<String> {
    match object.get(key) {
        None => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(ParseError::wrong_type(key, "a string")),
    }
}

pub(crate) fn optional_bool(object: &Object, key: &str) -> ParseResult<bool> {
    match object.get(key) {
        None => Ok(false),
        Some(Value::Bool(value)) => Ok(*value),
        Some(_) => Err(ParseError::wrong_type(key, "a boolean")),
    }
}

/// Elements of an optional array field. Absent yields an empty slice.
pub(crate) fn optional_array<'a>(object: &'a Object, key: &str) -> ParseResult<&'a [Value]> {
    match object.get(key) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ParseError::not_an_array(key)),
    }
}
