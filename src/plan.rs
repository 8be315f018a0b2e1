use crate::anchor::{Anchor, buffer_hashes};
use crate::buffer::FileBuffer;
use crate::edit::{AnchorSpec, EditOp};
use crate::error::HashlineError;
use crate::listing::listing_line;

const PRIORITY_PREPEND: u8 = 0;
const PRIORITY_REPLACE: u8 = 1;
const PRIORITY_APPEND: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Deleted,
    Replaced,
}

/// One edit resolved against the current buffer: a half-open `[start, end)`
/// interval of 1-indexed original line positions (empty for insertions) plus
/// the replacement content.
#[derive(Debug, Clone)]
pub struct ResolvedEdit {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub lines: Vec<String>,
    priority: u8,
}

impl ResolvedEdit {
    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    pub fn kind(&self) -> ChangeKind {
        if self.is_insertion() {
            ChangeKind::Inserted
        } else if self.lines.is_empty() {
            ChangeKind::Deleted
        } else {
            ChangeKind::Replaced
        }
    }

    pub fn span(&self) -> String {
        if self.is_insertion() {
            format!("insertion at line {}", self.start)
        } else if self.end == self.start + 1 {
            format!("{}", self.start)
        } else {
            format!("{}-{}", self.start, self.end - 1)
        }
    }
}

/// A frozen, validated, deterministically ordered batch of resolved edits.
#[derive(Debug, Clone)]
pub struct EditPlan {
    edits: Vec<ResolvedEdit>,
}

impl EditPlan {
    pub fn edits(&self) -> &[ResolvedEdit] {
        &self.edits
    }
}

pub fn build_plan(buffer: &FileBuffer, ops: &[EditOp]) -> Result<EditPlan, HashlineError> {
    let hashes = buffer_hashes(buffer);
    let mut edits = Vec::with_capacity(ops.len());

    for (index, op) in ops.iter().enumerate() {
        match op {
            EditOp::Replace { pos, end, lines } => {
                let (start, end) = resolve_range(buffer, &hashes, pos, end.as_ref(), index)?;
                edits.push(ResolvedEdit {
                    index,
                    start,
                    end,
                    lines: lines.clone(),
                    priority: PRIORITY_REPLACE,
                });
            }
            EditOp::Delete { pos, end } => {
                let (start, end) = resolve_range(buffer, &hashes, pos, end.as_ref(), index)?;
                edits.push(ResolvedEdit {
                    index,
                    start,
                    end,
                    lines: Vec::new(),
                    priority: PRIORITY_REPLACE,
                });
            }
            EditOp::Append { pos, lines } => {
                let at = match pos {
                    Some(spec) => resolve_anchor(buffer, &hashes, spec)?.line + 1,
                    None => buffer.line_count() + 1,
                };
                edits.push(ResolvedEdit {
                    index,
                    start: at,
                    end: at,
                    lines: lines.clone(),
                    priority: PRIORITY_APPEND,
                });
            }
            EditOp::Prepend { pos, lines } => {
                let at = match pos {
                    Some(spec) => resolve_anchor(buffer, &hashes, spec)?.line,
                    None => 1,
                };
                edits.push(ResolvedEdit {
                    index,
                    start: at,
                    end: at,
                    lines: lines.clone(),
                    priority: PRIORITY_PREPEND,
                });
            }
            EditOp::Write { .. } => {
                return Err(HashlineError::InvalidEditShape {
                    index,
                    message: "'write' must be the only operation in a batch".to_string(),
                });
            }
        }
    }

    edits.sort_by_key(|edit| (edit.start, edit.priority, edit.index));
    restore_request_order_for_colocated_insertions(&mut edits);
    detect_overlap(&edits)?;

    Ok(EditPlan { edits })
}

fn resolve_range(
    buffer: &FileBuffer,
    hashes: &[String],
    pos: &AnchorSpec,
    end: Option<&AnchorSpec>,
    index: usize,
) -> Result<(usize, usize), HashlineError> {
    let start_anchor = resolve_anchor(buffer, hashes, pos)?;
    let end_anchor = match end {
        Some(spec) => resolve_anchor(buffer, hashes, spec)?,
        None => start_anchor.clone(),
    };

    if end_anchor.line < start_anchor.line {
        return Err(HashlineError::InvalidEditShape {
            index,
            message: format!(
                "end line {} must be >= start line {}",
                end_anchor.line, start_anchor.line
            ),
        });
    }

    Ok((start_anchor.line, end_anchor.line + 1))
}

fn resolve_anchor(
    buffer: &FileBuffer,
    hashes: &[String],
    spec: &AnchorSpec,
) -> Result<Anchor, HashlineError> {
    let anchor = spec.normalize()?;
    if anchor.line > buffer.line_count() {
        return Err(HashlineError::AnchorOutOfRange {
            anchor: anchor.render(),
            line_count: buffer.line_count(),
        });
    }

    let current = &hashes[anchor.line - 1];
    if *current != anchor.hash {
        return Err(HashlineError::HashMismatch {
            anchor: anchor.render(),
            line: anchor.line,
            cited_hash: anchor.hash.clone(),
            current_hash: current.clone(),
            context: mismatch_context(buffer, hashes, anchor.line),
        });
    }

    Ok(anchor)
}

fn mismatch_context(buffer: &FileBuffer, hashes: &[String], line: usize) -> String {
    let first = line.saturating_sub(2).max(1);
    let last = (line + 2).min(buffer.line_count());
    (first..=last)
        .map(|number| {
            let marker = if number == line { '>' } else { ' ' };
            let content = buffer
                .line(number)
                .map(|entry| entry.content.as_str())
                .unwrap_or_default();
            format!(
                "{marker} {}",
                listing_line(number, &hashes[number - 1], content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// Insertions that land on the same point keep their original request order;
// the priority key only positions insertions relative to replaced ranges at
// a shared boundary.
fn restore_request_order_for_colocated_insertions(edits: &mut [ResolvedEdit]) {
    let mut run_start = 0;
    while run_start < edits.len() {
        let mut run_end = run_start + 1;
        while run_end < edits.len()
            && edits[run_end].is_insertion()
            && edits[run_start].is_insertion()
            && edits[run_end].start == edits[run_start].start
        {
            run_end += 1;
        }
        edits[run_start..run_end].sort_by_key(|edit| edit.index);
        run_start = run_end;
    }
}

fn detect_overlap(edits: &[ResolvedEdit]) -> Result<(), HashlineError> {
    for left_index in 0..edits.len() {
        for right_index in (left_index + 1)..edits.len() {
            let left = &edits[left_index];
            let right = &edits[right_index];
            if edits_conflict(left, right) {
                let (first, second) = if left.index <= right.index {
                    (left, right)
                } else {
                    (right, left)
                };
                return Err(HashlineError::OverlappingEdits {
                    first_index: first.index,
                    second_index: second.index,
                    first_span: first.span(),
                    second_span: second.span(),
                });
            }
        }
    }
    Ok(())
}

fn edits_conflict(left: &ResolvedEdit, right: &ResolvedEdit) -> bool {
    match (left.is_insertion(), right.is_insertion()) {
        (false, false) => left.start < right.end && right.start < left.end,
        (true, true) => false,
        (true, false) => right.start < left.start && left.start < right.end,
        (false, true) => left.start < right.start && right.start < left.end,
    }
}
