//! Builder for ffmpeg invocations.

use crate::args::{ArgMap, ArgumentProfile};
use crate::graph::{FilterGraph, StreamHandle};
use std::path::{Path, PathBuf};

/// Input/output target meaning "the process's own stdin/stdout".
pub const PIPE: &str = "pipe:";

#[derive(Debug, Clone)]
struct Input {
    options: ArgMap,
    source: String,
}

/// A fully described ffmpeg command line.
///
/// Tokens are emitted in this order: global tokens, then per input its
/// options followed by `-i <source>`, then `-filter_complex` and `-map`
/// arguments, output options, `-y` when overwriting and finally the output.
///
/// # Example
///
/// ```
/// use ffstream_av::args::ArgMap;
/// use ffstream_av::command::{FfmpegCommand, PIPE};
///
/// let mut cmd = FfmpegCommand::new("ffmpeg");
/// cmd.global(["-v", "error"])
///     .input(PIPE, ArgMap::new().with_flag("re"))
///     .output("rtmp://example/live", ArgMap::new().with("f", "flv"))
///     .overwrite(true);
///
/// assert_eq!(
///     cmd.args(),
///     vec!["-v", "error", "-re", "-i", "pipe:", "-f", "flv", "-y", "rtmp://example/live"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    program: PathBuf,
    global: Vec<String>,
    inputs: Vec<Input>,
    filter_complex: Option<String>,
    maps: Vec<String>,
    output_options: ArgMap,
    output: String,
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new command for the given ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            global: Vec::new(),
            inputs: Vec::new(),
            filter_complex: None,
            maps: Vec::new(),
            output_options: ArgMap::new(),
            output: PIPE.to_string(),
            overwrite: false,
        }
    }

    /// Encoder command: reads the relayed stream on stdin, writes `destination`.
    pub fn encoder(program: impl Into<PathBuf>, profile: &ArgumentProfile, destination: &str) -> Self {
        let mut cmd = Self::new(program);
        cmd.global(profile.global.iter().cloned())
            .input(PIPE, profile.input.clone())
            .output(destination, profile.output.clone())
            .overwrite(true);
        cmd
    }

    /// Decoder command: reads `source` (plus any graph inputs), filters
    /// through `graph`, writes the mapped streams to stdout.
    pub fn decoder(
        program: impl Into<PathBuf>,
        profile: &ArgumentProfile,
        source: &str,
        graph: &FilterGraph,
        video: &StreamHandle,
        audio: &StreamHandle,
    ) -> Self {
        let mut cmd = Self::new(program);
        cmd.global(profile.global.iter().cloned())
            .input(source, profile.input.clone());
        for extra in graph.extra_inputs() {
            cmd.input(extra.clone(), ArgMap::new());
        }
        if !graph.is_empty() {
            cmd.filter_complex(graph.render());
        }
        cmd.map(video.map_spec())
            .map(audio.map_spec())
            .output(PIPE, profile.output.clone());
        cmd
    }

    /// Append global tokens.
    pub fn global(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.global.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Add an input with its options.
    pub fn input(&mut self, source: impl Into<String>, options: ArgMap) -> &mut Self {
        self.inputs.push(Input {
            options,
            source: source.into(),
        });
        self
    }

    /// Set the `-filter_complex` value.
    pub fn filter_complex(&mut self, graph: impl Into<String>) -> &mut Self {
        self.filter_complex = Some(graph.into());
        self
    }

    /// Add a `-map` argument.
    pub fn map(&mut self, spec: impl Into<String>) -> &mut Self {
        self.maps.push(spec.into());
        self
    }

    /// Set the output target and its options.
    pub fn output(&mut self, target: impl Into<String>, options: ArgMap) -> &mut Self {
        self.output = target.into();
        self.output_options = options;
        self
    }

    /// Pass `-y` so an existing output is overwritten.
    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The output target.
    pub fn target(&self) -> &str {
        &self.output
    }

    /// Arguments in command line order, without the program.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.global.clone();

        for input in &self.inputs {
            args.extend(input.options.to_cli_args());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }

        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }

        args.extend(self.output_options.to_cli_args());

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push(self.output.clone());
        args
    }

    /// Render for logging; arguments containing spaces are quoted.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args().into_iter().map(|arg| {
                if arg.contains(char::is_whitespace) {
                    format!("'{}'", arg)
                } else {
                    arg
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
