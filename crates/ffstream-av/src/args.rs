//! ffmpeg argument profiles.
//!
//! An [`ArgumentProfile`] bundles the three argument slots ffmpeg accepts:
//! global tokens, options placed before `-i`, and options placed before the
//! output target. Option slots keep their insertion order because ffmpeg is
//! order sensitive for some of them.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered `key -> optional value` option list.
///
/// A `None` value renders as a bare `-key` flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    entries: Vec<(String, Option<String>)>,
}

impl ArgMap {
    /// Create an empty option list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing the value in place when the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert) with a value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Builder-style [`insert`](Self::insert) of a bare flag.
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.insert(key, None);
        self
    }

    /// Look up an option. The outer `Option` is presence, the inner one the value.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterate options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as ffmpeg command line tokens: `-key value` or `-key`.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            args.push(format!("-{}", key));
            if let Some(value) = value {
                args.push(value.clone());
            }
        }
        args
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, Option<V>)> for ArgMap {
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut map = ArgMap::new();
        for (k, v) in iter {
            map.insert(k, v.map(Into::into));
        }
        map
    }
}

impl Serialize for ArgMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A single option value as it may appear in a persisted profile.
///
/// Numbers and booleans are accepted and stringified; `null` is a bare flag.
#[derive(Deserialize)]
#[serde(untagged)]
enum ArgValue {
    Null(()),
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ArgValue {
    fn into_option(self) -> Option<String> {
        match self {
            ArgValue::Null(()) => None,
            ArgValue::Bool(b) => Some(b.to_string()),
            ArgValue::Int(i) => Some(i.to_string()),
            ArgValue::Float(f) => Some(f.to_string()),
            ArgValue::Str(s) => Some(s),
        }
    }
}

struct ArgMapVisitor;

impl<'de> Visitor<'de> for ArgMapVisitor {
    type Value = ArgMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of ffmpeg options to scalar values or null")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ArgMap, A::Error> {
        let mut map = ArgMap::new();
        while let Some((key, value)) = access.next_entry::<String, ArgValue>()? {
            if key.is_empty() {
                return Err(de::Error::custom("empty ffmpeg option name"));
            }
            map.insert(key, value.into_option());
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for ArgMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ArgMapVisitor)
    }
}

/// Invocation parameters for one ffmpeg stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentProfile {
    /// Tokens placed before everything else.
    pub global: Vec<String>,
    /// Options placed before the input.
    pub input: ArgMap,
    /// Options placed before the output target.
    pub output: ArgMap,
}

impl ArgumentProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_global_args(&self) -> bool {
        !self.global.is_empty()
    }

    pub fn has_input_args(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn has_output_args(&self) -> bool {
        !self.output.is_empty()
    }

    /// True if any of the three slots carries arguments.
    pub fn has_args(&self) -> bool {
        self.has_global_args() || self.has_input_args() || self.has_output_args()
    }
}

/// Built-in default profile pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilePreset {
    /// Intra mpeg2video / s302m mpegts between stages, libx264/aac flv out.
    #[default]
    Ffplayout,
    /// libx264/aac mpegts between stages, stream copy into flv.
    Standard,
}

impl ProfilePreset {
    /// Profile for the session-long encoder.
    pub fn encoder(self) -> ArgumentProfile {
        match self {
            ProfilePreset::Ffplayout => ArgumentProfile {
                global: tokens(&["-v", "error", "-hide_banner", "-nostats", "-thread_queue_size", "256"]),
                input: ArgMap::new().with_flag("re"),
                output: ArgMap::new()
                    .with("c:v", "libx264")
                    .with("crf", "23")
                    .with("x264-params", "keyint=50:min-keyint=25:scenecut=-1")
                    .with("maxrate", "1300k")
                    .with("bufsize", "2600k")
                    .with("preset", "medium")
                    .with("profile:v", "Main")
                    .with("level", "3.1")
                    .with("c:a", "aac")
                    .with("ar", "44100")
                    .with("b:a", "128k")
                    .with("flags", "+global_header")
                    .with("f", "flv"),
            },
            ProfilePreset::Standard => ArgumentProfile {
                global: tokens(&["-loglevel", "error", "-hide_banner"]),
                input: ArgMap::new().with_flag("re"),
                output: ArgMap::new()
                    .with("c:v", "copy")
                    .with("g", "60")
                    .with("keyint_min", "2")
                    .with("force_key_frames", "expr:gte(t,n_forced*2)")
                    .with("maxrate", "1300k")
                    .with("bufsize", "2600k")
                    .with("preset", "medium")
                    .with("c:a", "copy")
                    .with("bsf:a", "aac_adtstoasc")
                    .with("flags", "+global_header")
                    .with("f", "flv"),
            },
        }
    }

    /// Profile for the per-entry decoder.
    pub fn decoder(self) -> ArgumentProfile {
        match self {
            ProfilePreset::Ffplayout => ArgumentProfile {
                global: tokens(&["-v", "error", "-hide_banner", "-nostats"]),
                input: ArgMap::new(),
                output: ArgMap::new()
                    .with("pix_fmt", "yuv420p")
                    .with("framerate", "25")
                    .with("c:v", "mpeg2video")
                    .with_flag("intra")
                    .with("b:v", "51200k")
                    .with("minrate", "51200k")
                    .with("maxrate", "51200k")
                    .with("bufsize", "25600.0k")
                    .with("c:a", "s302m")
                    .with("strict", "-2")
                    .with("ar", "48000")
                    .with("ac", "2")
                    .with("f", "mpegts"),
            },
            ProfilePreset::Standard => ArgumentProfile {
                global: tokens(&["-loglevel", "error", "-hide_banner"]),
                input: ArgMap::new(),
                output: ArgMap::new()
                    .with("f", "mpegts")
                    .with("pix_fmt", "yuv420p")
                    .with("codec:v", "libx264")
                    .with("g", "60")
                    .with("keyint_min", "2")
                    .with("force_key_frames", "expr:gte(t,n_forced*2)")
                    .with("codec:a", "aac")
                    .with("bufsize", "400k")
                    .with("strict", "experimental")
                    .with("b:v", "800k")
                    .with("b:a", "64k")
                    .with("ar", "44100")
                    .with("maxrate", "800k")
                    .with("profile:v", "Main"),
            },
        }
    }
}

impl std::str::FromStr for ProfilePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ffplayout" => Ok(ProfilePreset::Ffplayout),
            "standard" => Ok(ProfilePreset::Standard),
            _ => Err(format!("Unknown profile preset: {}", s)),
        }
    }
}

fn tokens(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
