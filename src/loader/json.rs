//! JSON playlist documents.

use super::PlaylistLoader;
use crate::filter::{FilterInvocation, FilterRegistry};
use crate::playlist::{MediaEntry, Output, Playlist, PlaylistProfile, DEFAULT_NAME};
use crate::{Error, Result};
use ffstream_av::{ArgumentProfile, Prober};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Loads playlists from JSON files, probing every entry's source.
pub struct JsonPlaylistLoader<'a> {
    prober: &'a dyn Prober,
    filters: &'a FilterRegistry,
}

impl<'a> JsonPlaylistLoader<'a> {
    pub fn new(prober: &'a dyn Prober, filters: &'a FilterRegistry) -> Self {
        Self { prober, filters }
    }

    /// Build a playlist from document text. `path` is only recorded and used
    /// in error messages.
    pub fn load_str(&self, json: &str, path: Option<&Path>) -> Result<Playlist> {
        let fail = |message: String| match path {
            Some(path) => Error::playlist_at(path, message),
            None => Error::playlist(message),
        };

        let document: PlaylistDocument =
            serde_json::from_str(json).map_err(|e| fail(format!("invalid playlist document: {}", e)))?;

        let mut playlist = Playlist::new(document.name);
        playlist.path = path.map(Path::to_path_buf);
        playlist.output = document.output;
        playlist.shuffle = document.shuffle;
        playlist.looping = document.looping;
        playlist.loop_shuffle = document.loop_shuffle;

        let mut profile = document.profile.unwrap_or_default();
        if let Some(encoder) = document.encoder {
            profile.encoder = encoder;
        }
        if let Some(decoder) = document.decoder {
            profile.decoder = decoder;
        }
        playlist.profile = profile;

        playlist.filters = self.invocations(&document.filters)?;

        for (index, record) in document.entries.into_iter().enumerate() {
            let entry = self.entry(record).map_err(|e| match e {
                Error::Playlist { path: None, message } => fail(format!("entry {}: {}", index + 1, message)),
                other => other,
            })?;
            playlist.entries.push(entry);
        }

        tracing::debug!(
            "Loaded playlist {:?} with {} entries and {} filters",
            playlist.name,
            playlist.entry_count(),
            playlist.filters.len()
        );

        Ok(playlist)
    }

    fn invocations(&self, records: &[FilterRecord]) -> Result<Vec<FilterInvocation>> {
        records
            .iter()
            .map(|record| self.filters.invocation(&record.kind, &record.options))
            .collect()
    }

    fn entry(&self, record: EntryRecord) -> Result<MediaEntry> {
        let info = self.prober.probe(&record.source)?;
        let probed_duration = info
            .video_stream()
            .and_then(|v| v.duration)
            .filter(|d| *d != 0.0);

        let mut entry = MediaEntry::from_media_info(info);

        if let Some(start) = record.start {
            entry = entry.with_start(start);
        }

        if let Some(duration) = record.duration {
            // the probe knows better than a stale document
            let duration = match probed_duration {
                Some(probed) if probed != duration => probed,
                _ => duration,
            };
            entry = entry.with_duration(duration);
        }

        let end = record.end.unwrap_or_else(|| entry.duration());
        entry = entry.with_end(end);

        if entry.start() < 0.0 || entry.duration() < 0.0 {
            return Err(Error::playlist(format!(
                "{}: start and duration must not be negative",
                record.source
            )));
        }
        if entry.end() < entry.start() {
            return Err(Error::playlist(format!(
                "{}: end {} is before start {}",
                record.source,
                entry.end(),
                entry.start()
            )));
        }

        if let Some(title) = record.title {
            entry = entry.with_title(title);
        }
        if let Some(author) = record.author {
            entry = entry.with_author(author);
        }

        for invocation in self.invocations(&record.filters)? {
            entry = entry.with_filter(invocation);
        }

        // Legacy `decoder` key overrides `profile`, same as at playlist level.
        let decoder = record
            .decoder
            .or(record.profile.map(|p| p.decoder))
            .unwrap_or_default();

        Ok(entry.with_decoder_profile(decoder))
    }
}

impl PlaylistLoader for JsonPlaylistLoader<'_> {
    fn load(&self, path: &Path) -> Result<Playlist> {
        if !path.is_file() {
            return Err(Error::playlist_at(
                path,
                format!("playlist path {} is not a file", path.display()),
            ));
        }

        let json = std::fs::read_to_string(path)?;
        self.load_str(&json, Some(path))
    }
}

/// Serialize a playlist to the document format the loader reads.
pub fn to_json(playlist: &Playlist) -> Result<String> {
    let document = PlaylistRecord {
        name: &playlist.name,
        shuffle: playlist.shuffle,
        looping: playlist.looping,
        loop_shuffle: playlist.loop_shuffle,
        output: &playlist.output,
        profile: &playlist.profile,
        filters: &playlist.filters,
        entries: playlist.entries.iter().map(EntryView::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Write `playlist` to `path`. Refuses to replace an existing file unless `force`.
pub fn write_playlist(playlist: &Playlist, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::playlist_at(
            path,
            format!("{} already exists", path.display()),
        ));
    }

    std::fs::write(path, to_json(playlist)?)?;
    tracing::info!("Wrote playlist to {}", path.display());
    Ok(())
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

#[derive(Debug, Deserialize)]
struct PlaylistDocument {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    shuffle: bool,
    #[serde(default, rename = "loop")]
    looping: bool,
    #[serde(default)]
    loop_shuffle: bool,
    output: Output,
    #[serde(default)]
    profile: Option<PlaylistProfile>,
    /// Older documents keep the profiles at the top level.
    #[serde(default)]
    encoder: Option<ArgumentProfile>,
    #[serde(default)]
    decoder: Option<ArgumentProfile>,
    #[serde(default)]
    filters: Vec<FilterRecord>,
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
struct FilterRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Value,
}

#[derive(Debug, Deserialize)]
struct EntryRecord {
    source: String,
    start: Option<f64>,
    end: Option<f64>,
    duration: Option<f64>,
    title: Option<String>,
    author: Option<String>,
    #[serde(default)]
    filters: Vec<FilterRecord>,
    profile: Option<EntryProfile>,
    decoder: Option<ArgumentProfile>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct EntryProfile {
    #[serde(default)]
    decoder: ArgumentProfile,
}

#[derive(Serialize)]
struct PlaylistRecord<'a> {
    name: &'a str,
    shuffle: bool,
    #[serde(rename = "loop")]
    looping: bool,
    loop_shuffle: bool,
    output: &'a Output,
    profile: &'a PlaylistProfile,
    filters: &'a [FilterInvocation],
    entries: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    source: &'a str,
    start: f64,
    end: f64,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    filters: &'a [FilterInvocation],
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<EntryProfileView<'a>>,
}

#[derive(Serialize)]
struct EntryProfileView<'a> {
    decoder: &'a ArgumentProfile,
}

impl<'a> From<&'a MediaEntry> for EntryView<'a> {
    fn from(entry: &'a MediaEntry) -> Self {
        let decoder = entry.decoder_profile();
        Self {
            source: entry.source(),
            start: entry.start(),
            end: entry.end(),
            duration: entry.duration(),
            title: entry.title(),
            author: entry.author(),
            filters: entry.filters(),
            profile: decoder.has_args().then_some(EntryProfileView { decoder }),
        }
    }
}
