use crate::models::TrackRecord;
use std::collections::HashMap;
use std::path::Path;

/// Group holding every record that failed to decode.
pub const ERRORS_KEY: &str = "__errors__";
/// Tag-based fallback key for records with no usable album tag.
pub const UNKNOWN_KEY: &str = "unknown";
/// Path-based key when the parent directory canonicalizes to nothing.
pub const UNKNOWN_DIR_KEY: &str = "unknown_dir";

pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Trimmed, lower-cased, single-spaced.
pub fn canonicalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Album groups in the order their first record appears.
pub type AlbumGroups<'a> = Vec<(String, Vec<&'a TrackRecord>)>;

/// Partition records into album groups, keeping first-seen order.
///
/// Records are grouped by parent directory whenever any of them carries a
/// path; otherwise by album tag. Failed records always land in `__errors__`.
pub fn group_by_album(records: &[TrackRecord]) -> AlbumGroups<'_> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: AlbumGroups<'_> = Vec::new();
    let by_folder = records.iter().any(|r| !r.path.as_os_str().is_empty());

    for record in records {
        let key = if record.is_error() {
            ERRORS_KEY.to_string()
        } else if by_folder {
            folder_key(&record.path)
        } else {
            tag_key(record)
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    groups
}

fn folder_key(path: &Path) -> String {
    let parent = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let key = canonicalize(&parent);
    if key.is_empty() {
        UNKNOWN_DIR_KEY.to_string()
    } else {
        key
    }
}

fn tag_key(record: &TrackRecord) -> String {
    let key = canonicalize(record.album().unwrap_or(""));
    if key.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        key
    }
}

/// Most frequent value; ties go to the value seen first.
pub fn most_common<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for value in order {
        let count = counts[value];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v)
}

/// Album name to show for a group: its most common album tag.
pub fn display_album(records: &[&TrackRecord]) -> String {
    most_common(records.iter().filter_map(|r| r.album()))
        .unwrap_or(UNKNOWN_ALBUM)
        .to_string()
}

/// Artist name to show for a group: its most common artist tag.
pub fn display_artist(records: &[&TrackRecord]) -> String {
    most_common(records.iter().filter_map(|r| r.artist()))
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string()
}
