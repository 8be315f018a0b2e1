use serde::Deserialize;

use crate::anchor::Anchor;
use crate::error::HashlineError;

/// Anchor as it appears in the edit batch JSON: the canonical
/// `"LINE#HASH"` string, or the legacy `{line, hash}` object kept for one
/// release of backward compatibility.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnchorSpec {
    Text(String),
    Object { line: usize, hash: String },
}

impl AnchorSpec {
    pub fn normalize(&self) -> Result<Anchor, HashlineError> {
        match self {
            Self::Text(value) => crate::anchor::parse_anchor(value),
            Self::Object { line, hash } => Anchor::from_parts(*line, hash),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    Replace {
        pos: AnchorSpec,
        #[serde(default)]
        end: Option<AnchorSpec>,
        lines: Vec<String>,
    },
    Append {
        #[serde(default)]
        pos: Option<AnchorSpec>,
        lines: Vec<String>,
    },
    Prepend {
        #[serde(default)]
        pos: Option<AnchorSpec>,
        lines: Vec<String>,
    },
    Delete {
        pos: AnchorSpec,
        #[serde(default)]
        end: Option<AnchorSpec>,
    },
    Write {
        content: String,
    },
}

impl EditOp {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

pub fn parse_edit_batch(json: &str) -> Result<Vec<EditOp>, HashlineError> {
    let ops: Vec<EditOp> =
        serde_json::from_str(json).map_err(|source| HashlineError::InvalidEditJson { source })?;
    if ops.is_empty() {
        return Err(HashlineError::EmptyEditBatch);
    }
    Ok(ops)
}
