use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HashlineError {
    #[error("Invalid anchor '{anchor}': {message}")]
    InvalidAnchorSyntax { anchor: String, message: String },

    #[error("Anchor '{anchor}' is out of range: file has {line_count} lines")]
    AnchorOutOfRange { anchor: String, line_count: usize },

    #[error(
        "Hash mismatch at line {line}: anchor '{anchor}' cites hash '{cited_hash}' but the current hash is '{current_hash}'.\nThe file has changed since it was read. Current content around line {line}:\n{context}\nRe-read the file and retry with fresh anchors."
    )]
    HashMismatch {
        anchor: String,
        line: usize,
        cited_hash: String,
        current_hash: String,
        context: String,
    },

    #[error(
        "Overlapping edits: edit #{first_index} targets lines {first_span} and edit #{second_index} targets lines {second_span}"
    )]
    OverlappingEdits {
        first_index: usize,
        second_index: usize,
        first_span: String,
        second_span: String,
    },

    #[error("Invalid edit #{index}: {message}")]
    InvalidEditShape { index: usize, message: String },

    #[error("Edit batch is empty: at least one operation is required")]
    EmptyEditBatch,

    #[error("Failed to parse edit batch JSON: {source}")]
    InvalidEditJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read stdin: {source}")]
    StdinRead {
        #[source]
        source: std::io::Error,
    },

    #[error("File '{path}' is not valid UTF-8: {source}")]
    Encoding {
        path: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl HashlineError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidAnchorSyntax { .. }
            | Self::InvalidEditShape { .. }
            | Self::EmptyEditBatch
            | Self::InvalidEditJson { .. }
            | Self::InvalidArguments { .. } => 2,
            Self::AnchorOutOfRange { .. }
            | Self::HashMismatch { .. }
            | Self::OverlappingEdits { .. } => 3,
            Self::Io { .. } | Self::StdinRead { .. } | Self::Encoding { .. } => 4,
        }
    }
}
