use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::apply::apply_plan;
use crate::apply::io::{acquire_edit_lock, write_bytes_atomically};
use crate::buffer::FileBuffer;
use crate::edit::{EditOp, parse_edit_batch};
use crate::error::HashlineError;
use crate::plan::build_plan;

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(value_name = "FILE", help = "File to edit")]
    pub path: PathBuf,
    #[arg(
        long,
        value_name = "JSON",
        conflicts_with = "edits_stdin",
        help = "Edit batch as a JSON array"
    )]
    pub edits: Option<String>,
    #[arg(long, help = "Read the edit batch JSON from stdin")]
    pub edits_stdin: bool,
}

pub fn run_edit(args: EditArgs) -> Result<String, HashlineError> {
    let batch_json = match (args.edits, args.edits_stdin) {
        (Some(json), false) => json,
        (None, true) => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .map_err(|source| HashlineError::StdinRead { source })?;
            json
        }
        (None, false) => {
            return Err(HashlineError::InvalidArguments {
                message: "either --edits <JSON> or --edits-stdin is required".to_string(),
            });
        }
        (Some(_), true) => unreachable!("clap rejects --edits together with --edits-stdin"),
    };

    let ops = parse_edit_batch(&batch_json)?;
    if let Some(rewrite) = sole_write_op(&ops) {
        return run_write(&args.path, rewrite);
    }

    let _lock = acquire_edit_lock(&args.path)?;
    let bytes = fs::read(&args.path).map_err(|error| HashlineError::io(&args.path, error))?;
    let buffer = FileBuffer::from_bytes(&bytes).map_err(|source| HashlineError::Encoding {
        path: args.path.display().to_string(),
        source,
    })?;

    let plan = build_plan(&buffer, &ops)?;
    let outcome = apply_plan(&buffer, &plan);
    let new_text = outcome.buffer.to_text();

    if new_text.as_bytes() == bytes.as_slice() {
        return Ok("No changes made".to_string());
    }

    write_bytes_atomically(&args.path, new_text.as_bytes())?;
    Ok(crate::diff::render_edit_response(
        &args.path,
        &buffer,
        &outcome.buffer,
        &outcome.changes,
    ))
}

// A lone 'write' bypasses the anchored pipeline; a 'write' mixed into an
// anchored batch is rejected by build_plan.
fn sole_write_op(ops: &[EditOp]) -> Option<&str> {
    match ops {
        [EditOp::Write { content }] => Some(content),
        _ => None,
    }
}

fn run_write(path: &Path, content: &str) -> Result<String, HashlineError> {
    let _lock = match acquire_edit_lock(path) {
        Ok(lock) => Some(lock),
        Err(HashlineError::Io { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            None
        }
        Err(error) => return Err(error),
    };

    write_bytes_atomically(path, content.as_bytes())?;
    let line_count = FileBuffer::from_text(content).line_count();
    Ok(format!(
        "Edit applied successfully (first change at line 1).\n\nWrote {line_count} lines to {}.",
        path.display()
    ))
}
