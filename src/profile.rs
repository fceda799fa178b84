//! Choosing the argument profile for each process stage.
//!
//! The first profile that carries any arguments wins outright: the entry's
//! (decode stage only), then the playlist's, then the built-in preset. Nothing
//! is merged between levels.

use crate::playlist::{MediaEntry, Playlist};
use chrono::Datelike;
use ffstream_av::{ArgumentProfile, ProfilePreset};

/// Tag written as the service provider of every session.
pub const SERVICE_PROVIDER: &str = concat!("ffstream/", env!("CARGO_PKG_VERSION"));

/// First profile with arguments, or `fallback` when none has any.
fn first_with_args<'a>(
    candidates: impl IntoIterator<Item = &'a ArgumentProfile>,
    fallback: impl FnOnce() -> ArgumentProfile,
) -> ArgumentProfile {
    candidates
        .into_iter()
        .find(|profile| profile.has_args())
        .cloned()
        .unwrap_or_else(fallback)
}

/// Decode-stage profile for `entry`.
pub fn resolve_decoder(entry: &MediaEntry, playlist: &Playlist, preset: ProfilePreset) -> ArgumentProfile {
    first_with_args(
        [entry.decoder_profile(), &playlist.profile.decoder],
        || preset.decoder(),
    )
}

/// Encode-stage profile for the session.
pub fn resolve_encoder(playlist: &Playlist, preset: ProfilePreset) -> ArgumentProfile {
    first_with_args([&playlist.profile.encoder], || preset.encoder())
}

/// Add the session metadata tags to the profile's output options.
///
/// Takes the profile by value; callers pass the resolved copy, never the
/// playlist's own profile.
pub fn inject_metadata(profile: ArgumentProfile, playlist_name: &str) -> ArgumentProfile {
    inject_metadata_for_year(profile, playlist_name, chrono::Local::now().year())
}

fn inject_metadata_for_year(mut profile: ArgumentProfile, playlist_name: &str, year: i32) -> ArgumentProfile {
    let tags = [
        ("metadata:g:0", format!("service_name={}", playlist_name)),
        ("metadata:g:1", format!("service_provider={}", SERVICE_PROVIDER)),
        ("metadata:g:2", format!("year={}", year)),
    ];
    for (key, value) in tags {
        profile.output.insert(key, Some(value));
    }
    profile
}
