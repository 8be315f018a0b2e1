pub mod anchor;
pub mod apply;
pub mod buffer;
pub mod cli;
pub mod diff;
pub mod edit;
pub mod error;
pub mod listing;
pub mod plan;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
