use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Container family reported by the tag decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    Mp3,
    Flac,
    OggVorbis,
    Wave,
    /// Anything else the decoder understood (opus, mp4, aac, ...), by name.
    Other(String),
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp3 => f.write_str("mp3"),
            Self::Flac => f.write_str("flac"),
            Self::OggVorbis => f.write_str("ogg vorbis"),
            Self::Wave => f.write_str("wave"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Technical stream parameters. Every field is optional because some
/// containers don't expose all of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamInfo {
    pub duration_secs: Option<f64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    pub bitrate: Option<u32>,
}

/// Container-native tag key → values, in key order.
pub type RawTags = BTreeMap<String, Vec<String>>;

/// Normalized tag fields for one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub track_number: Option<u32>,
    pub track_total: Option<u32>,
    pub id3_version: Option<String>,
    pub artwork_hashes: BTreeSet<String>,
    pub raw: RawTags,
}

/// Why a candidate file could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    Mp3Unreadable,
    GenericUnreadable,
    Unrecognized,
}

impl DecodeFailure {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mp3Unreadable => "mp3_unreadable",
            Self::GenericUnreadable => "unreadable",
            Self::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTrack {
    pub container: ContainerKind,
    pub stream: StreamInfo,
    pub tags: TrackTags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackOutcome {
    Decoded(DecodedTrack),
    Failed(DecodeFailure),
}

/// One audio file's normalized view.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub path: PathBuf,
    pub file_name: String,
    /// SHA-1 of the full file; `None` only if the bytes couldn't be read.
    pub content_hash: Option<String>,
    pub size_bytes: u64,
    pub outcome: TrackOutcome,
}

impl TrackRecord {
    pub fn decoded(&self) -> Option<&DecodedTrack> {
        match &self.outcome {
            TrackOutcome::Decoded(d) => Some(d),
            TrackOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<DecodeFailure> {
        match &self.outcome {
            TrackOutcome::Decoded(_) => None,
            TrackOutcome::Failed(f) => Some(*f),
        }
    }

    pub fn is_error(&self) -> bool {
        self.failure().is_some()
    }

    pub fn tags(&self) -> Option<&TrackTags> {
        self.decoded().map(|d| &d.tags)
    }

    pub fn stream(&self) -> Option<&StreamInfo> {
        self.decoded().map(|d| &d.stream)
    }

    pub fn container(&self) -> Option<&ContainerKind> {
        self.decoded().map(|d| &d.container)
    }

    /// Album tag, if present and non-empty.
    pub fn album(&self) -> Option<&str> {
        self.tags()
            .and_then(|t| t.album.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Artist tag, if present and non-empty.
    pub fn artist(&self) -> Option<&str> {
        self.tags()
            .and_then(|t| t.artist.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn track_number(&self) -> Option<u32> {
        self.tags().and_then(|t| t.track_number)
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.stream().and_then(|s| s.duration_secs)
    }

    /// Lower-cased extension with its leading dot, or empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }
}

/// Album severity tier. Ordering is significant: `None < Info < Warn < Crit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    None,
    Info,
    Warn,
    Crit,
}

impl Severity {
    /// Bracketed tag used in report headers.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Crit => "[CRIT]",
        }
    }
}
