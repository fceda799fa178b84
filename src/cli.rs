use clap::{Parser, Subcommand};
use ffstream::commands::{
    CheckToolsCommand, Command, FixMetaCommand, GenerateCommand, ProbeCommand, StreamCommand,
    VersionCommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffstream")]
#[command(author, version, about = "Stream a playlist of media files as one continuous ffmpeg output")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start streaming from a JSON playlist
    Stream {
        /// The playlist to play from
        #[arg(short, long)]
        playlist: PathBuf,

        /// Only load the playlist, checking for errors
        #[arg(short, long)]
        check_playlist: bool,
    },

    /// Generate a playlist from a directory of media files
    Generate {
        /// Directory to scan for video files
        #[arg(short, long)]
        directory: PathBuf,

        /// Where to write the playlist
        #[arg(short, long, default_value = "playlist.json")]
        output: PathBuf,

        /// Scan the directory recursively
        #[arg(short, long)]
        recursive: bool,

        /// Overwrite an existing playlist
        #[arg(short, long)]
        force: bool,

        /// Shuffle the resulting playlist entries
        #[arg(short, long)]
        shuffle: bool,

        /// File extensions to consider
        #[arg(short, long, num_args = 1..)]
        types: Option<Vec<String>>,
    },

    /// Fix missing duration metadata of media files in a directory
    FixMeta {
        /// Directory to scan for video files
        #[arg(short, long)]
        directory: PathBuf,

        /// Scan the directory recursively
        #[arg(short, long)]
        recursive: bool,

        /// File extensions to consider
        #[arg(short, long, num_args = 1..)]
        types: Option<Vec<String>>,
    },

    /// Probe a media source and display information
    Probe {
        /// File or URI to probe
        #[arg(required = true)]
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}

impl Commands {
    pub fn into_command(self) -> Box<dyn Command> {
        match self {
            Commands::Stream {
                playlist,
                check_playlist,
            } => Box::new(StreamCommand {
                playlist,
                check_playlist,
            }),
            Commands::Generate {
                directory,
                output,
                recursive,
                force,
                shuffle,
                types,
            } => Box::new(GenerateCommand {
                directory,
                output,
                recursive,
                force,
                shuffle,
                types,
            }),
            Commands::FixMeta {
                directory,
                recursive,
                types,
            } => Box::new(FixMetaCommand {
                directory,
                recursive,
                types,
            }),
            Commands::Probe { source, json } => Box::new(ProbeCommand { source, json }),
            Commands::CheckTools => Box::new(CheckToolsCommand),
            Commands::Version => Box::new(VersionCommand),
        }
    }
}
