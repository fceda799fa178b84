//! CLI subcommands.
//!
//! Each subcommand is a [`Command`] built by the binary from parsed
//! arguments and run against a shared [`AppContext`].

mod generate;
mod media;
mod stream;
mod tools;

pub use generate::GenerateCommand;
pub use media::FixMetaCommand;
pub use stream::StreamCommand;
pub use tools::{CheckToolsCommand, ProbeCommand, VersionCommand};

use crate::context::AppContext;
use anyhow::Result;

/// One subcommand.
pub trait Command {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &AppContext) -> Result<()>;
}
