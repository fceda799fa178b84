//! Output destination and target resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Parse `"<width>x<height>"`; the separator is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (w, h) = lower
            .split_once('x')
            .ok_or_else(|| format!("expected <width>x<height>, got {:?}", s))?;

        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width in resolution {:?}", s))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height in resolution {:?}", s))?;

        if width == 0 || height == 0 {
            return Err(format!("resolution {:?} must be non-zero in both dimensions", s));
        }

        Ok(Self { width, height })
    }
}

impl TryFrom<String> for Resolution {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Where the encoder sends the session, and at what size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Opaque destination handed to the encoder (URL or path).
    pub destination: String,
    pub resolution: Resolution,
}

impl Output {
    pub fn new(destination: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            destination: destination.into(),
            resolution,
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new("rtmp://server.com/application/key", Resolution::default())
    }
}
