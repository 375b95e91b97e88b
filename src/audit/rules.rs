use crate::models::{ContainerKind, DecodeFailure, Severity, TrackRecord};
use std::collections::{BTreeSet, HashMap};

/// ID3 versions we consider well-supported by players.
pub const STANDARD_ID3_VERSIONS: &[&str] = &["2.3.0", "2.4.0"];

/// How many duplicate groups get their own sentence.
const MAX_DUPLICATE_GROUPS_SHOWN: usize = 3;

/// One candidate message produced by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn info(message: String) -> Self {
        Self { severity: Severity::Info, message }
    }

    fn warn(message: String) -> Self {
        Self { severity: Severity::Warn, message }
    }

    fn crit(message: String) -> Self {
        Self { severity: Severity::Crit, message }
    }
}

/// Cached per-album outcome, shared by scoring and rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumDiagnostics {
    pub severity: Severity,
    pub messages: Vec<String>,
    pub duration_secs: f64,
    pub size_bytes: u64,
}

type Rule = fn(&[&TrackRecord]) -> Vec<Finding>;

/// Rules in evaluation order. Message order within a tier follows this table.
const RULES: &[Rule] = &[
    mixed_formats,
    duplicate_content,
    inconsistent_album,
    inconsistent_artist,
    artwork,
    inconsistent_sample_rate,
    inconsistent_channels,
    id3_versions,
    unreadable_mp3s,
];

/// Run every rule over one album and reduce the findings.
pub fn diagnose(records: &[&TrackRecord]) -> AlbumDiagnostics {
    let findings: Vec<Finding> = RULES.iter().flat_map(|rule| rule(records)).collect();
    let (severity, messages) = resolve(findings);

    AlbumDiagnostics {
        severity,
        messages,
        duration_secs: records.iter().filter_map(|r| r.duration_secs()).sum(),
        size_bytes: records.iter().map(|r| r.size_bytes).sum(),
    }
}

/// Pick the album severity and prune messages:
/// Crit keeps Warn then Crit, Warn keeps Warn, Info keeps Info.
pub fn resolve(findings: Vec<Finding>) -> (Severity, Vec<String>) {
    let severity = findings
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(Severity::None);

    let kept: &[Severity] = match severity {
        Severity::Crit => &[Severity::Warn, Severity::Crit],
        Severity::Warn => &[Severity::Warn],
        Severity::Info => &[Severity::Info],
        Severity::None => &[],
    };

    let messages = kept
        .iter()
        .flat_map(|tier| {
            findings
                .iter()
                .filter(move |f| f.severity == *tier)
                .map(|f| f.message.clone())
        })
        .collect();

    (severity, messages)
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// === Rules ===

fn mixed_formats(records: &[&TrackRecord]) -> Vec<Finding> {
    let extensions: BTreeSet<String> = records.iter().map(|r| r.extension()).collect();
    if extensions.len() > 1 {
        vec![Finding::info(format!(
            "There are multiple file formats found in this album: {}.",
            join(&extensions)
        ))]
    } else {
        Vec::new()
    }
}

fn duplicate_content(records: &[&TrackRecord]) -> Vec<Finding> {
    // Hash groups in first-seen order
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&TrackRecord>> = Vec::new();
    for &record in records {
        let Some(hash) = record.content_hash.as_deref() else {
            continue;
        };
        let slot = *index.entry(hash).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    let duplicates: Vec<&Vec<&TrackRecord>> = groups.iter().filter(|g| g.len() > 1).collect();
    if duplicates.is_empty() {
        return Vec::new();
    }

    let mut findings: Vec<Finding> = duplicates
        .iter()
        .take(MAX_DUPLICATE_GROUPS_SHOWN)
        .map(|g| {
            Finding::warn(format!(
                "Duplicate audio content detected, for example: {} (+{} more in that group).",
                g[0].file_name,
                g.len() - 1
            ))
        })
        .collect();

    // Remaining is counted against every hash group, singletons included.
    let remaining = groups.len() - findings.len();
    if remaining > 0 {
        findings.push(Finding::warn(format!(
            "There are {remaining} more duplicate group(s) not shown."
        )));
    }
    findings
}

fn inconsistent_album(records: &[&TrackRecord]) -> Vec<Finding> {
    let names: BTreeSet<&str> = records.iter().filter_map(|r| r.album()).collect();
    if names.len() > 1 {
        vec![Finding::warn(
            "Tracks in this album do not all share the same album name.".to_string(),
        )]
    } else {
        Vec::new()
    }
}

fn inconsistent_artist(records: &[&TrackRecord]) -> Vec<Finding> {
    let names: BTreeSet<&str> = records.iter().filter_map(|r| r.artist()).collect();
    if names.len() > 1 {
        vec![Finding::warn(
            "Tracks in this album do not all share the same artist.".to_string(),
        )]
    } else {
        Vec::new()
    }
}

/// Missing and mismatched cover art. A track's smallest artwork hash stands
/// in for the track when comparing.
fn artwork(records: &[&TrackRecord]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    let mut present: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        let first = record
            .tags()
            .and_then(|t| t.artwork_hashes.iter().next())
            .map(String::as_str);
        match first {
            Some(hash) => {
                present.insert(hash);
            }
            None => missing.push(
                record
                    .track_number()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| record.file_name.clone()),
            ),
        }
    }

    if !missing.is_empty() && missing.len() < records.len() {
        findings.push(Finding::warn(format!(
            "The following tracks do not have an album cover: {}.",
            missing.join(", ")
        )));
    }
    if present.len() > 1 {
        findings.push(Finding::warn(
            "Cover artwork differs across tracks in this album.".to_string(),
        ));
    }
    findings
}

fn inconsistent_sample_rate(records: &[&TrackRecord]) -> Vec<Finding> {
    // A zero rate means "unknown" and is ignored
    let rates: BTreeSet<u32> = records
        .iter()
        .filter_map(|r| r.stream().and_then(|s| s.sample_rate))
        .filter(|&rate| rate != 0)
        .collect();
    if rates.len() > 1 {
        vec![Finding::warn(format!(
            "Tracks use multiple sample rates in this album: {}.",
            join(&rates)
        ))]
    } else {
        Vec::new()
    }
}

fn inconsistent_channels(records: &[&TrackRecord]) -> Vec<Finding> {
    let channels: BTreeSet<u8> = records
        .iter()
        .filter_map(|r| r.stream().and_then(|s| s.channels))
        .collect();
    if channels.len() > 1 {
        vec![Finding::warn(format!(
            "Tracks use multiple channel counts in this album: {}.",
            join(&channels)
        ))]
    } else {
        Vec::new()
    }
}

fn id3_versions(records: &[&TrackRecord]) -> Vec<Finding> {
    let versions: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.tags().and_then(|t| t.id3_version.as_deref()))
        .filter(|v| !v.is_empty())
        .collect();

    let mut findings = Vec::new();
    if versions.len() > 1 {
        findings.push(Finding::warn(format!(
            "ID3 versions are not consistent across tracks: {}.",
            join(&versions)
        )));
    }

    let non_standard: Vec<&str> = versions
        .iter()
        .copied()
        .filter(|v| !STANDARD_ID3_VERSIONS.contains(v))
        .collect();
    if !non_standard.is_empty() {
        findings.push(Finding::warn(format!(
            "Some tracks use non-standard ID3 versions: {}.",
            join(non_standard)
        )));
    }
    findings
}

fn unreadable_mp3s(records: &[&TrackRecord]) -> Vec<Finding> {
    let count = records
        .iter()
        .filter(|r| {
            r.failure() == Some(DecodeFailure::Mp3Unreadable)
                || (r.container() == Some(&ContainerKind::Mp3) && r.duration_secs().is_none())
        })
        .count();
    if count > 0 {
        vec![Finding::crit(format!(
            "{count} MP3 file(s) appear unreadable or invalid."
        ))]
    } else {
        Vec::new()
    }
}
