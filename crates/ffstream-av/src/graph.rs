//! In-memory ffmpeg filter graph.
//!
//! Nodes are appended as filters are applied and the whole graph is rendered
//! once into a `-filter_complex` string. Nothing here spawns a process.
//!
//! # Example
//!
//! ```
//! use ffstream_av::graph::{FilterArgs, FilterGraph};
//!
//! let mut graph = FilterGraph::new();
//! let video = graph.input_video(0);
//! let scaled = graph.filter(&video, "scale", FilterArgs::new().arg("1280").arg("720"));
//! assert_eq!(graph.render(), "[0:v]scale=1280:720[s0]");
//! assert_eq!(scaled.map_spec(), "[s0]");
//! ```

use std::fmt;

/// Characters escaped inside a single filter option value.
const VALUE_SPECIAL: &[char] = &['\\', '\'', '=', ':'];
/// Characters escaped across a whole filter description.
const GRAPH_SPECIAL: &[char] = &['\\', '\'', '[', ']', ',', ';'];
/// Characters escaped in drawtext text before any other escaping.
const TEXT_SPECIAL: &[char] = &['\\', '\'', '%'];

/// Media kind carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    fn specifier(self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
        }
    }
}

/// Reference to a stream inside a [`FilterGraph`].
///
/// Either a stream of one of the command inputs, or a labelled output of a
/// filter node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    label: String,
    kind: StreamKind,
    from_input: bool,
}

impl StreamHandle {
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Label as used inside the graph, without brackets.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether this handle refers directly to a command input stream.
    pub fn is_input(&self) -> bool {
        self.from_input
    }

    /// Argument for `-map`: `0:a` for input streams, `[s3]` for node outputs.
    pub fn map_spec(&self) -> String {
        if self.from_input {
            self.label.clone()
        } else {
            format!("[{}]", self.label)
        }
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)
    }
}

/// Positional and keyword options for one filter, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    positional: Vec<String>,
    keyword: Vec<(String, String)>,
}

impl FilterArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional option.
    pub fn arg(mut self, value: impl ToString) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Set a keyword option, replacing an earlier value for the same key.
    pub fn kw(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// In-place form of [`kw`](Self::kw).
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.keyword.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.keyword.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keyword
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    fn render(&self) -> String {
        self.positional
            .iter()
            .map(|v| escape(v, VALUE_SPECIAL))
            .chain(
                self.keyword
                    .iter()
                    .map(|(k, v)| format!("{}={}", escape(k, VALUE_SPECIAL), escape(v, VALUE_SPECIAL))),
            )
            .collect::<Vec<_>>()
            .join(":")
    }
}

#[derive(Debug, Clone)]
struct FilterNode {
    inputs: Vec<String>,
    name: String,
    args: FilterArgs,
    outputs: Vec<String>,
}

impl FilterNode {
    fn render(&self) -> String {
        let mut spec = escape(&self.name, VALUE_SPECIAL);
        if !self.args.is_empty() {
            spec.push('=');
            spec.push_str(&self.args.render());
        }

        let mut out = String::new();
        for input in &self.inputs {
            out.push_str(&format!("[{}]", input));
        }
        out.push_str(&escape(&spec, GRAPH_SPECIAL));
        for output in &self.outputs {
            out.push_str(&format!("[{}]", output));
        }
        out
    }
}

/// Directed filter graph rendered as a single `-filter_complex` value.
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    extra_inputs: Vec<String>,
    nodes: Vec<FilterNode>,
    next_label: usize,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Video stream of the command input at `index`.
    pub fn input_video(&self, index: usize) -> StreamHandle {
        Self::input_stream(index, StreamKind::Video)
    }

    /// Audio stream of the command input at `index`.
    pub fn input_audio(&self, index: usize) -> StreamHandle {
        Self::input_stream(index, StreamKind::Audio)
    }

    fn input_stream(index: usize, kind: StreamKind) -> StreamHandle {
        StreamHandle {
            label: format!("{}:{}", index, kind.specifier()),
            kind,
            from_input: true,
        }
    }

    /// Register an additional command input (e.g., an overlay image).
    ///
    /// Input 0 is the primary source, so the first extra input gets index 1.
    pub fn add_input(&mut self, source: impl Into<String>) -> usize {
        self.extra_inputs.push(source.into());
        self.extra_inputs.len()
    }

    /// Additional inputs in registration order.
    pub fn extra_inputs(&self) -> &[String] {
        &self.extra_inputs
    }

    /// Apply a single-input, single-output filter.
    pub fn filter(&mut self, input: &StreamHandle, name: &str, args: FilterArgs) -> StreamHandle {
        let kind = input.kind;
        let mut outputs = self.filter_multi(&[input], name, args, &[kind]);
        // filter_multi returns exactly one handle per requested kind
        outputs.remove(0)
    }

    /// Apply a filter with any number of inputs and typed outputs.
    pub fn filter_multi(
        &mut self,
        inputs: &[&StreamHandle],
        name: &str,
        args: FilterArgs,
        outputs: &[StreamKind],
    ) -> Vec<StreamHandle> {
        let handles: Vec<StreamHandle> = outputs
            .iter()
            .map(|&kind| {
                let label = format!("s{}", self.next_label);
                self.next_label += 1;
                StreamHandle {
                    label,
                    kind,
                    from_input: false,
                }
            })
            .collect();

        self.nodes.push(FilterNode {
            inputs: inputs.iter().map(|h| h.label.clone()).collect(),
            name: name.to_string(),
            args,
            outputs: handles.iter().map(|h| h.label.clone()).collect(),
        });

        handles
    }

    /// Draw text on a video stream. `text` is escaped the way drawtext expects.
    pub fn drawtext(&mut self, video: &StreamHandle, text: &str, kwargs: FilterArgs) -> StreamHandle {
        let mut args = FilterArgs::new().kw("text", escape(text, TEXT_SPECIAL));
        for (k, v) in kwargs.keyword {
            args.set(k, v);
        }
        args.positional = kwargs.positional;
        self.filter(video, "drawtext", args)
    }

    /// Overlay `overlay` on top of `main`, repeating the last overlay frame at its end.
    pub fn overlay(&mut self, main: &StreamHandle, overlay: &StreamHandle, kwargs: FilterArgs) -> StreamHandle {
        let mut args = kwargs;
        if args.get("eof_action").is_none() {
            args.set("eof_action", "repeat");
        }
        let mut outputs = self.filter_multi(&[main, overlay], "overlay", args, &[StreamKind::Video]);
        outputs.remove(0)
    }

    /// Join one video and one audio segment.
    pub fn concat(&mut self, video: &StreamHandle, audio: &StreamHandle) -> (StreamHandle, StreamHandle) {
        let args = FilterArgs::new().kw("n", 1).kw("v", 1).kw("a", 1);
        let mut outputs =
            self.filter_multi(&[video, audio], "concat", args, &[StreamKind::Video, StreamKind::Audio]);
        let audio = outputs.remove(1);
        let video = outputs.remove(0);
        (video, audio)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the graph as a `-filter_complex` value.
    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(FilterNode::render)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Backslash-escape every occurrence of `chars` in `value`.
pub fn escape(value: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if chars.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
