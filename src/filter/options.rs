//! Typed, validated filter options.

use crate::{Error, Result};
use ffstream_av::{ArgMap, FilterArgs, StreamKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Options of one filter invocation, checked once at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterOptions {
    ContinuousText(TextOptions),
    IntervalText(IntervalTextOptions),
    ImageOverlay(ImageOverlayOptions),
    VideoInfo(VideoInfoOptions),
    /// Any ffmpeg filter, passed through by name.
    Custom(CustomFilterOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOptions {
    pub text: String,
    #[serde(skip_serializing_if = "ArgMap::is_empty")]
    pub kwargs: ArgMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalTextOptions {
    pub text: String,
    pub duration: f64,
    pub interval: f64,
    pub fallback_divisor: i64,
    #[serde(skip_serializing_if = "ArgMap::is_empty")]
    pub kwargs: ArgMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOverlayOptions {
    pub image: String,
    pub animated: bool,
    #[serde(skip_serializing_if = "ArgMap::is_empty")]
    pub kwargs: ArgMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfoOptions {
    pub duration: f64,
    pub interval: f64,
    pub fallback_divisor: i64,
    pub title_position: Position,
    pub author_position: Position,
    #[serde(skip_serializing_if = "ArgMap::is_empty")]
    pub kwargs: ArgMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomFilterOptions {
    /// ffmpeg filter name, e.g. `hflip` or `volume`.
    pub filter: String,
    pub stream: TargetStream,
    #[serde(skip_serializing_if = "ArgMap::is_empty")]
    pub args: ArgMap,
}

/// Which stream a custom filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStream {
    #[default]
    Video,
    Audio,
}

impl From<TargetStream> for StreamKind {
    fn from(value: TargetStream) -> Self {
        match value {
            TargetStream::Video => StreamKind::Video,
            TargetStream::Audio => StreamKind::Audio,
        }
    }
}

/// A drawtext/overlay coordinate: pixels or an ffmpeg expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Coordinate {
    Pixels(i64),
    Expr(String),
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Pixels(px) => write!(f, "{}", px),
            Coordinate::Expr(expr) => f.write_str(expr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x: Coordinate::Pixels(x),
            y: Coordinate::Pixels(y),
        }
    }
}

/// Kwargs as filter keyword arguments, keeping their order.
pub(crate) fn kwargs_to_filter_args(kwargs: &ArgMap) -> FilterArgs {
    let mut args = FilterArgs::new();
    for (key, value) in kwargs.iter() {
        args.set(key, value.unwrap_or_default());
    }
    args
}

/// Field-by-field reader over a raw JSON options object.
///
/// Every failure names the filter and the offending field.
pub(crate) struct OptionReader {
    filter: &'static str,
    map: Map<String, Value>,
}

impl OptionReader {
    /// `null` is treated as an empty object; anything else must be an object.
    pub fn new(filter: &'static str, options: &Value) -> Result<Self> {
        let map = match options {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => return Err(Error::validation(filter, "options", "expected an object")),
        };
        Ok(Self { filter, map })
    }

    fn error(&self, field: &str, message: impl Into<String>) -> Error {
        Error::validation(self.filter, field, message)
    }

    pub fn required_str(&self, field: &str) -> Result<String> {
        match self.map.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.error(field, "expected a string")),
            None => Err(self.error(field, "is required")),
        }
    }

    /// A non-negative number, given either as a JSON number or a numeric string.
    pub fn required_seconds(&self, field: &str) -> Result<f64> {
        let value = match self.map.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
            None => return Err(self.error(field, "is required")),
        };

        match value {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(self.error(field, "expected a non-negative number of seconds")),
        }
    }

    pub fn int_or(&self, field: &str, default: i64) -> Result<i64> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| self.error(field, "expected an integer")),
            Some(_) => Err(self.error(field, "expected an integer")),
        }
    }

    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.error(field, "expected a boolean")),
        }
    }

    /// Object of scalar values. Missing means empty.
    pub fn arg_map(&self, field: &str) -> Result<ArgMap> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(ArgMap::new()),
            Some(value @ Value::Object(obj)) => {
                if obj.values().any(Value::is_null) {
                    return Err(self.error(field, "values must not be null"));
                }
                serde_json::from_value(value.clone())
                    .map_err(|e| self.error(field, format!("expected an object of scalar values: {}", e)))
            }
            Some(_) => Err(self.error(field, "expected an object")),
        }
    }

    pub fn kwargs(&self) -> Result<ArgMap> {
        self.arg_map("kwargs")
    }

    /// `{ "x": int|string, "y": int|string }`, or `default` when absent.
    pub fn position_or(&self, field: &str, default: Position) -> Result<Position> {
        let obj = match self.map.get(field) {
            None | Some(Value::Null) => return Ok(default),
            Some(Value::Object(obj)) => obj,
            Some(_) => return Err(self.error(field, "expected an object with x and y")),
        };

        let coordinate = |axis: &str| -> Result<Coordinate> {
            match obj.get(axis) {
                Some(Value::Number(n)) => n
                    .as_i64()
                    .map(Coordinate::Pixels)
                    .ok_or_else(|| self.error(field, format!("{} must be an integer or a string", axis))),
                Some(Value::String(s)) => Ok(Coordinate::Expr(s.clone())),
                Some(_) => Err(self.error(field, format!("{} must be an integer or a string", axis))),
                None => Err(self.error(field, format!("missing member {}", axis))),
            }
        };

        Ok(Position {
            x: coordinate("x")?,
            y: coordinate("y")?,
        })
    }

    pub fn target_stream(&self, field: &str) -> Result<TargetStream> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(TargetStream::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|_| self.error(field, "expected \"video\" or \"audio\"")),
        }
    }
}
