/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-Meta error types: per-document parse
    failures raised by the metadata parsers, and the wider
    runtime taxonomy used by the binary entry point.

  Security / Safety Notes:
    Parse errors quote field names and offending scalar values
    only; whole documents are never embedded in messages.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    ParseError is returned by every parse/load entry point.
    MetaError wraps it alongside I/O, network and configuration
    failures and maps each domain to a stable exit code.

  Revision History:
    2025-11-12 COD  Split parse errors from runtime errors.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-Meta runtime operations.
pub type Result<T> = std::result::Result<T, MetaError>;

/// Result alias for parse and load operations on a single document.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Coarse classification of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The document's formatVersion is unknown or malformed.
    Schema,
    /// A field has the wrong shape, or the document contradicts itself.
    Structural,
    /// A required identity field is absent.
    MissingField,
    /// The injected payload loader rejected the document.
    Payload,
}

/// Failure to turn one metadata document into an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown format version")]
    UnknownFormatVersion,
    #[error("{field} is not an array")]
    NotAnArray { field: String },
    #[error("{field} is missing")]
    MissingField { field: String },
    #[error("{field} is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("{field} is not a valid ISO-8601 timestamp: `{value}`")]
    InvalidTimestamp { field: String, value: String },
    #[error("{field} `{value}` is not a valid identifier")]
    InvalidIdentifier { field: String, value: String },
    #[error("{field} entry targets its own package {uid}")]
    SelfRequirement { field: String, uid: String },
    #[error("document for {found} cannot be merged into {expected}")]
    IdentityMismatch { expected: String, found: String },
    #[error("payload for {path}: {message}")]
    Payload { path: String, message: String },
}

impl ParseError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ParseError::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn not_an_array(field: impl Into<String>) -> Self {
        ParseError::NotAnArray {
            field: field.into(),
        }
    }

    pub(crate) fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        ParseError::WrongType {
            field: field.into(),
            expected,
        }
    }

    /// Classify the error for callers that only care about the domain.
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::UnknownFormatVersion => ParseErrorKind::Schema,
            ParseError::MissingField { .. } => ParseErrorKind::MissingField,
            ParseError::Payload { .. } => ParseErrorKind::Payload,
            ParseError::NotAnArray { .. }
            | ParseError::WrongType { .. }
            | ParseError::InvalidTimestamp { .. }
            | ParseError::InvalidIdentifier { .. }
            | ParseError::SelfRequirement { .. }
            | ParseError::IdentityMismatch { .. } => ParseErrorKind::Structural,
        }
    }
}

/// Enumerates high-level error domains surfaced by Syn-Meta.
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error("Metadata {document}: {source}")]
    Parse {
        document: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MetaError {
    pub fn parse(document: impl Into<String>, source: ParseError) -> Self {
        MetaError::Parse {
            document: document.into(),
            source,
        }
    }

    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            MetaError::Config(_) => ExitCode::from(20),
            MetaError::Network(_) => ExitCode::from(30),
            MetaError::Serialization(_) => ExitCode::from(31),
            MetaError::Parse { .. } => ExitCode::from(32),
            MetaError::Filesystem(_) => ExitCode::from(40),
            MetaError::Io(_) => ExitCode::from(41),
            MetaError::Runtime(_) => ExitCode::from(50),
        }
    }
}
