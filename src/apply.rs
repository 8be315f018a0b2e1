use crate::buffer::{FileBuffer, Line, Terminator};
use crate::plan::{ChangeKind, EditPlan};

pub mod io;

/// Where one applied edit landed: its pre-edit interval in the original
/// buffer and its post-edit interval in the new one, both half-open and
/// 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub pre_start: usize,
    pub pre_end: usize,
    pub post_start: usize,
    pub post_end: usize,
}

#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub buffer: FileBuffer,
    pub changes: Vec<Change>,
}

pub fn apply_plan(buffer: &FileBuffer, plan: &EditPlan) -> ApplyOutcome {
    let original = buffer.lines();
    let mut output: Vec<Line> = Vec::with_capacity(original.len());
    let mut changes = Vec::with_capacity(plan.edits().len());
    let mut cursor = 1usize;

    for edit in plan.edits() {
        while cursor < edit.start && cursor <= original.len() {
            output.push(original[cursor - 1].clone());
            cursor += 1;
        }

        let post_start = output.len() + 1;
        if edit.is_insertion() {
            let inherited = inherited_terminator(&output, original, edit.start);
            for content in &edit.lines {
                output.push(Line::new(content.clone(), inherited));
            }
        } else {
            for (offset, content) in edit.lines.iter().enumerate() {
                let source_index = (edit.start + offset).min(edit.end - 1);
                let terminator = original[source_index - 1].terminator;
                output.push(Line::new(content.clone(), terminator));
            }
            cursor = cursor.max(edit.end);
        }
        let post_end = output.len() + 1;

        changes.push(Change {
            kind: edit.kind(),
            pre_start: edit.start,
            pre_end: if edit.is_insertion() {
                edit.start
            } else {
                edit.end
            },
            post_start,
            post_end,
        });
    }

    while cursor <= original.len() {
        output.push(original[cursor - 1].clone());
        cursor += 1;
    }

    seal_internal_terminators(&mut output);

    ApplyOutcome {
        buffer: FileBuffer::from_lines(output),
        changes,
    }
}

// Inserted lines take the terminator of the line they follow; a BOF insert
// takes the successor's. The seal pass below repairs any Terminator::None
// this inherits into the middle of the buffer.
fn inherited_terminator(output: &[Line], original: &[Line], insert_at: usize) -> Terminator {
    if let Some(predecessor) = output.last() {
        predecessor.terminator
    } else if let Some(successor) = original.get(insert_at - 1) {
        successor.terminator
    } else {
        Terminator::Lf
    }
}

fn seal_internal_terminators(lines: &mut [Line]) {
    let last_index = lines.len().saturating_sub(1);
    for line in &mut lines[..last_index] {
        if line.terminator == Terminator::None {
            line.terminator = Terminator::Lf;
        }
    }
}
