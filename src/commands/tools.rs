use super::Command;
use crate::context::AppContext;
use anyhow::Result;
use ffstream_av::tools::{FFMPEG, FFPROBE};
use ffstream_av::{check_tool, MediaInfo};

/// Print what the prober reports for one source.
#[derive(Debug, Clone)]
pub struct ProbeCommand {
    /// File path or any URI ffprobe accepts.
    pub source: String,
    pub json: bool,
}

impl Command for ProbeCommand {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn run(&self, ctx: &AppContext) -> Result<()> {
        let info = ctx.prober().probe(&self.source).map_err(crate::Error::from)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_media_info(&info);
        }
        Ok(())
    }
}

fn print_media_info(info: &MediaInfo) {
    println!("Source: {}", info.source);
    if let Some(ref container) = info.container {
        println!("Container: {}", container);
    }
    if let Some(duration) = info.duration {
        let secs = duration as u64;
        println!("Duration: {:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
    }

    println!("\nVideo Streams: {}", info.video_streams.len());
    for stream in &info.video_streams {
        print!("  [{}] {} {}x{}", stream.index, stream.codec, stream.width, stream.height);
        if let Some(duration) = stream.duration {
            print!(", {:.3}s", duration);
        }
        println!();
    }

    println!("\nAudio Streams: {}", info.audio_streams.len());
    for stream in &info.audio_streams {
        print!("  [{}] {} {}ch", stream.index, stream.codec, stream.channels);
        if let Some(rate) = stream.sample_rate {
            print!(" {} Hz", rate);
        }
        if let Some(duration) = stream.duration {
            print!(", {:.3}s", duration);
        }
        println!();
    }
}

/// Report whether ffmpeg and ffprobe can be run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckToolsCommand;

impl Command for CheckToolsCommand {
    fn name(&self) -> &'static str {
        "check-tools"
    }

    fn run(&self, ctx: &AppContext) -> Result<()> {
        println!("Checking external tools...\n");

        let configured = [
            (FFMPEG, &ctx.config.tools.ffmpeg_path),
            (FFPROBE, &ctx.config.tools.ffprobe_path),
        ];
        let mut all_ok = true;

        for (name, path) in configured {
            let tool = check_tool(name, path.as_deref());

            let status = if tool.available {
                "✓"
            } else {
                all_ok = false;
                "✗"
            };

            print!("{} {}", status, name);

            if let Some(ref version) = tool.version {
                print!(" ({})", version);
            }

            if let Some(ref path) = tool.path {
                print!(" - {}", path.display());
            }

            println!();
        }

        println!();
        if all_ok {
            println!("All required tools are available!");
        } else {
            println!("Some tools are missing. Install ffmpeg to stream playlists.");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionCommand;

impl Command for VersionCommand {
    fn name(&self) -> &'static str {
        "version"
    }

    fn run(&self, _ctx: &AppContext) -> Result<()> {
        println!("ffstream {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
