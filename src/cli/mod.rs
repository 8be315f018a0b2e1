use clap::{Parser, Subcommand};

pub mod edit;
pub mod read;

#[derive(Debug, Parser)]
#[command(name = "hashline-tools")]
#[command(about = "Hash-anchored line editing for agent-driven file workflows")]
#[command(
    long_about = "Hash-anchored line reading and editing. Every line in 'read' output carries a content-derived anchor; every edit must cite a current anchor, so a stale view of the file is refused instead of silently corrupting it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "List a file as anchored '<line>#<hash>:<content>' lines")]
    Read(read::ReadArgs),
    #[command(about = "Apply a JSON batch of anchored edits and print the resulting diff")]
    Edit(edit::EditArgs),
}
