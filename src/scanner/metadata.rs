use crate::models::{
    ContainerKind, DecodeFailure, DecodedTrack, RawTags, TrackOutcome, TrackRecord, TrackTags,
};
use crate::scanner::decode::{DecodeError, DecodedFile, TagDecoder};
use crate::scanner::hash::{sha1_of_bytes, sha1_of_file};
use lofty::tag::{ItemKey, ItemValue, Tag, TagType};
use std::collections::BTreeSet;
use std::path::Path;

/// Decode one file into a normalized record. Never fails: decoder errors
/// become error-tagged records, which still carry size and content hash.
pub fn read_track(decoder: &dyn TagDecoder, path: &Path) -> TrackRecord {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let content_hash = match sha1_of_file(path) {
        Ok(h) => Some(h),
        Err(e) => {
            log::debug!("Could not hash {}: {}", path.display(), e);
            None
        }
    };

    let outcome = match decoder.decode(path) {
        Ok(decoded) => TrackOutcome::Decoded(normalize(decoded)),
        Err(e) => {
            log::debug!("Could not read tags from {}: {}", path.display(), e);
            TrackOutcome::Failed(failure_kind(&e))
        }
    };

    TrackRecord {
        path: path.to_path_buf(),
        file_name,
        content_hash,
        size_bytes,
        outcome,
    }
}

fn failure_kind(err: &DecodeError) -> DecodeFailure {
    match err {
        DecodeError::Malformed { kind: ContainerKind::Mp3, .. } => DecodeFailure::Mp3Unreadable,
        DecodeError::Malformed { .. } | DecodeError::Unreadable(_) => {
            DecodeFailure::GenericUnreadable
        }
        DecodeError::Unrecognized => DecodeFailure::Unrecognized,
    }
}

/// Map decoder output into the uniform model, dispatching on container kind.
pub fn normalize(decoded: DecodedFile) -> DecodedTrack {
    let tags = match &decoded.kind {
        ContainerKind::Mp3 => id3_tags(&decoded, true),
        ContainerKind::Wave => id3_tags(&decoded, false),
        ContainerKind::Flac | ContainerKind::OggVorbis => vorbis_tags(&decoded),
        ContainerKind::Other(_) => passthrough_tags(&decoded),
    };

    DecodedTrack {
        container: decoded.kind,
        stream: decoded.stream,
        tags,
    }
}

// === Per-container translation tables ===

/// ID3v2 frame ids for the fields we keep. TRCK and TPOS are rebuilt from
/// their number/total halves.
fn id3_table() -> [(ItemKey, &'static str); 6] {
    [
        (ItemKey::TrackTitle, "TIT2"),
        (ItemKey::AlbumTitle, "TALB"),
        (ItemKey::TrackArtist, "TPE1"),
        (ItemKey::AlbumArtist, "TPE2"),
        (ItemKey::Genre, "TCON"),
        (ItemKey::RecordingDate, "TDRC"),
    ]
}

fn vorbis_table() -> [(ItemKey, &'static str); 8] {
    [
        (ItemKey::TrackTitle, "TITLE"),
        (ItemKey::AlbumTitle, "ALBUM"),
        (ItemKey::TrackArtist, "ARTIST"),
        (ItemKey::AlbumArtist, "ALBUMARTIST"),
        (ItemKey::TrackNumber, "TRACKNUMBER"),
        (ItemKey::TrackTotal, "TRACKTOTAL"),
        (ItemKey::RecordingDate, "DATE"),
        (ItemKey::Genre, "GENRE"),
    ]
}

fn find_tag(decoded: &DecodedFile, tag_type: TagType) -> Option<&Tag> {
    decoded.tags.iter().find(|t| t.tag_type() == tag_type)
}

fn copy_fields(tag: &Tag, table: &[(ItemKey, &'static str)], raw: &mut RawTags) {
    for (key, name) in table {
        let values: Vec<String> = tag.get_strings(key).map(|s| s.to_string()).collect();
        if !values.is_empty() {
            raw.insert((*name).to_string(), values);
        }
    }
}

/// "n" or "n/total", the way the frame is stored on disk.
fn joined_pair(tag: &Tag, number: &ItemKey, total: &ItemKey) -> Option<String> {
    let n = tag.get_string(number)?;
    Some(match tag.get_string(total) {
        Some(t) => format!("{n}/{t}"),
        None => n.to_string(),
    })
}

fn artwork_hashes(tag: &Tag) -> BTreeSet<String> {
    tag.pictures()
        .iter()
        .filter_map(|p| sha1_of_bytes(p.data()))
        .collect()
}

fn id3_tags(decoded: &DecodedFile, with_artwork: bool) -> TrackTags {
    let mut raw = RawTags::new();
    let mut artwork = BTreeSet::new();

    if let Some(tag) = find_tag(decoded, TagType::Id3v2) {
        copy_fields(tag, &id3_table(), &mut raw);
        if let Some(trck) = joined_pair(tag, &ItemKey::TrackNumber, &ItemKey::TrackTotal) {
            raw.insert("TRCK".to_string(), vec![trck]);
        }
        if let Some(tpos) = joined_pair(tag, &ItemKey::DiscNumber, &ItemKey::DiscTotal) {
            raw.insert("TPOS".to_string(), vec![tpos]);
        }
        if with_artwork {
            artwork = artwork_hashes(tag);
        }
    }

    elevate(raw, artwork, decoded.id3_version.clone())
}

fn vorbis_tags(decoded: &DecodedFile) -> TrackTags {
    let mut raw = RawTags::new();
    let mut artwork = BTreeSet::new();

    if let Some(tag) = find_tag(decoded, TagType::VorbisComments) {
        copy_fields(tag, &vorbis_table(), &mut raw);
        artwork = artwork_hashes(tag);
    }

    elevate(raw, artwork, None)
}

/// Unknown containers: keep every textual item under its native key, promote nothing.
fn passthrough_tags(decoded: &DecodedFile) -> TrackTags {
    let mut raw = RawTags::new();
    for tag in &decoded.tags {
        for item in tag.items() {
            let value = match item.value() {
                ItemValue::Text(s) | ItemValue::Locator(s) => s.clone(),
                _ => continue,
            };
            // Container-native key where lofty knows one
            let key = item
                .key()
                .map_key(tag.tag_type(), true)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{:?}", item.key()));
            raw.entry(key).or_default().push(value);
        }
    }

    TrackTags {
        raw,
        ..Default::default()
    }
}

fn first_text(raw: &RawTags, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| raw.get(*k).and_then(|v| v.first()))
        .cloned()
}

fn elevate(raw: RawTags, artwork_hashes: BTreeSet<String>, id3_version: Option<String>) -> TrackTags {
    let (track_number, track_total) = first_text(&raw, &["TRCK", "TRACKNUMBER"])
        .map(|v| parse_track_number(&v))
        .unwrap_or((None, None));

    TrackTags {
        title: first_text(&raw, &["TIT2", "TITLE"]),
        album: first_text(&raw, &["TALB", "ALBUM"]),
        artist: first_text(&raw, &["TPE1", "ARTIST"]),
        track_number,
        track_total,
        id3_version,
        artwork_hashes,
        raw,
    }
}

/// Parse "3", "3/12" or " 3 / 12 ". Each half parses independently;
/// a bad half is simply absent.
pub fn parse_track_number(value: &str) -> (Option<u32>, Option<u32>) {
    let value = value.trim();
    if value.is_empty() {
        return (None, None);
    }
    match value.split_once('/') {
        Some((number, total)) => (number.trim().parse().ok(), total.trim().parse().ok()),
        None => (value.parse().ok(), None),
    }
}
