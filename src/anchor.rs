use crate::buffer::FileBuffer;
use crate::error::HashlineError;

pub const HASH_LEN: usize = 2;

/// Reserved marker for deletion rows in the diff; unreachable from real
/// content because the anchor alphabet excludes the space character.
pub const DELETED_HASH: &str = "  ";

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Cumulative line hasher. The hash of line i covers the contents of lines
/// 1..=i joined by '\n', so editing any line invalidates every later anchor.
#[derive(Debug, Clone)]
pub struct HashChain {
    hasher: blake3::Hasher,
    lines_fed: usize,
}

impl HashChain {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
            lines_fed: 0,
        }
    }

    pub fn push(&mut self, content: &str) -> String {
        if self.lines_fed > 0 {
            self.hasher.update(b"\n");
        }
        self.hasher.update(content.as_bytes());
        self.lines_fed += 1;

        let digest = self.hasher.finalize();
        let bytes = digest.as_bytes();
        let mut hash = String::with_capacity(HASH_LEN);
        hash.push(ALPHABET[(bytes[0] % 36) as usize] as char);
        hash.push(ALPHABET[(bytes[1] % 36) as usize] as char);
        hash
    }
}

impl Default for HashChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes for every line of the buffer, index 0 holding the hash of line 1.
pub fn buffer_hashes(buffer: &FileBuffer) -> Vec<String> {
    let mut chain = HashChain::new();
    buffer
        .contents()
        .map(|content| chain.push(content))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub line: usize,
    pub hash: String,
}

impl Anchor {
    pub fn from_parts(line: usize, hash: &str) -> Result<Self, HashlineError> {
        validate(line, hash, &format!("{line}#{hash}"))
    }

    pub fn render(&self) -> String {
        format!("{}#{}", self.line, self.hash)
    }
}

pub fn parse_anchor(value: &str) -> Result<Anchor, HashlineError> {
    let Some((line_raw, hash_raw)) = value.split_once('#') else {
        return Err(HashlineError::InvalidAnchorSyntax {
            anchor: value.to_string(),
            message: "expected format '<line>#<hash>'".to_string(),
        });
    };

    if line_raw.is_empty() || !line_raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(HashlineError::InvalidAnchorSyntax {
            anchor: value.to_string(),
            message: "line number must be a positive integer".to_string(),
        });
    }

    let line = line_raw
        .parse::<usize>()
        .map_err(|_| HashlineError::InvalidAnchorSyntax {
            anchor: value.to_string(),
            message: "line number must be a positive integer".to_string(),
        })?;

    validate(line, hash_raw, value)
}

fn validate(line: usize, hash: &str, rendered: &str) -> Result<Anchor, HashlineError> {
    if line == 0 {
        return Err(HashlineError::InvalidAnchorSyntax {
            anchor: rendered.to_string(),
            message: "line number must be >= 1".to_string(),
        });
    }

    let normalized = hash.to_ascii_uppercase();
    if normalized.len() != HASH_LEN {
        return Err(HashlineError::InvalidAnchorSyntax {
            anchor: rendered.to_string(),
            message: format!("hash must be exactly {HASH_LEN} characters"),
        });
    }
    if !normalized.bytes().all(|byte| ALPHABET.contains(&byte)) {
        return Err(HashlineError::InvalidAnchorSyntax {
            anchor: rendered.to_string(),
            message: "hash must use only 0-9 and A-Z".to_string(),
        });
    }

    Ok(Anchor {
        line,
        hash: normalized,
    })
}
