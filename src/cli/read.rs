use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::buffer::FileBuffer;
use crate::error::HashlineError;
use crate::listing::render_listing;

#[derive(Debug, Args)]
pub struct ReadArgs {
    #[arg(value_name = "FILE", help = "File to read")]
    pub path: PathBuf,
    #[arg(
        long,
        value_name = "N",
        help = "0-indexed line to start at (clamped to the file)"
    )]
    pub offset: Option<usize>,
    #[arg(
        long,
        value_name = "M",
        help = "Maximum number of lines to emit (default 2000)"
    )]
    pub limit: Option<usize>,
}

pub fn run_read(args: ReadArgs) -> Result<String, HashlineError> {
    let bytes = fs::read(&args.path).map_err(|error| HashlineError::io(&args.path, error))?;
    let buffer = FileBuffer::from_bytes(&bytes).map_err(|source| HashlineError::Encoding {
        path: args.path.display().to_string(),
        source,
    })?;
    Ok(render_listing(&buffer, args.offset, args.limit))
}
