//! ffstream - continuous live streaming of media playlists through ffmpeg
//!
//! A playlist of media entries is played as one uninterrupted output: a
//! single long-lived ffmpeg encoder receives the bytes of one short-lived
//! ffmpeg decoder per entry.
//!
//! This library crate exposes the core functionality for integration testing.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod loader;
pub mod playlist;
pub mod profile;
pub mod stream;

pub use error::{Error, Result};
