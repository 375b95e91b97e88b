pub mod group;
pub mod health;
pub mod rules;

use crate::models::{Severity, TrackRecord};
use crate::report::format::format_bytes;
use crate::scanner::DebugTrace;
use group::{display_album, display_artist, group_by_album, ERRORS_KEY};
use rules::AlbumDiagnostics;

/// One album that has something to report.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumReport {
    /// Grouping key (canonical folder path or album tag).
    pub key: String,
    pub album_name: String,
    pub artist_name: String,
    pub diagnostics: AlbumDiagnostics,
}

/// Final aggregate for a scan, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub root: String,
    pub album_count: usize,
    pub track_count: usize,
    pub total_size_bytes: u64,
    pub total_duration_secs: f64,
    pub health: u8,
    /// Albums with a non-`None` severity, ordered by display name.
    pub albums: Vec<AlbumReport>,
    /// Present when debug output was requested.
    pub debug: Option<Vec<String>>,
}

/// Group, diagnose and score scanned records.
pub fn build_report(root: &str, records: &[TrackRecord], trace: &DebugTrace) -> ScanReport {
    let recognized: Vec<&TrackRecord> = records.iter().filter(|r| !r.is_error()).collect();
    let failed: Vec<&TrackRecord> = records.iter().filter(|r| r.is_error()).collect();

    let groups = group_by_album(records);
    let mut albums: Vec<(String, Vec<&TrackRecord>, String)> = groups
        .into_iter()
        .filter(|(key, _)| key != ERRORS_KEY)
        .map(|(key, members)| {
            let name = display_album(&members);
            (key, members, name)
        })
        .collect();
    // Stable, so albums sharing a display name keep first-seen order
    albums.sort_by_key(|(_, _, name)| name.to_lowercase());

    let mut warn_albums = 0;
    let mut crit_albums = 0;
    let mut reports = Vec::new();

    for (key, members, album_name) in &albums {
        // Diagnostics are computed once here and reused for scoring and output
        let diagnostics = rules::diagnose(members);
        match diagnostics.severity {
            Severity::Crit => crit_albums += 1,
            Severity::Warn => warn_albums += 1,
            Severity::Info | Severity::None => {}
        }
        if diagnostics.severity == Severity::None {
            continue;
        }
        reports.push(AlbumReport {
            key: key.clone(),
            album_name: album_name.clone(),
            artist_name: display_artist(members),
            diagnostics,
        });
    }

    let album_count = albums.len();
    let health = health::health_percent(album_count, warn_albums, crit_albums);
    log::info!(
        "{} albums: {} warn, {} crit, health {}%",
        album_count,
        warn_albums,
        crit_albums,
        health
    );

    let debug = trace.is_enabled().then(|| {
        let mut lines = trace.lines().to_vec();
        if !failed.is_empty() {
            let bytes: u64 = failed.iter().map(|r| r.size_bytes).sum();
            lines.push(format!(
                "[debug] skipped {} unreadable file(s), {}",
                failed.len(),
                format_bytes(bytes)
            ));
        }
        lines
    });

    ScanReport {
        root: root.to_string(),
        album_count,
        track_count: recognized.len(),
        total_size_bytes: recognized.iter().map(|r| r.size_bytes).sum(),
        total_duration_secs: recognized.iter().filter_map(|r| r.duration_secs()).sum(),
        health,
        albums: reports,
        debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContainerKind, DecodeFailure, DecodedTrack, StreamInfo, TrackOutcome, TrackTags,
    };
    use std::path::PathBuf;

    fn track(path: &str, hash: &str, album: &str, artist: &str) -> TrackRecord {
        let path = PathBuf::from(path);
        TrackRecord {
            file_name: path.file_name().unwrap().to_string_lossy().to_string(),
            path,
            content_hash: Some(hash.to_string()),
            size_bytes: 1024,
            outcome: TrackOutcome::Decoded(DecodedTrack {
                container: ContainerKind::Flac,
                stream: StreamInfo {
                    duration_secs: Some(60.0),
                    sample_rate: Some(44100),
                    channels: Some(2),
                    bitrate: None,
                },
                tags: TrackTags {
                    album: Some(album.to_string()),
                    artist: Some(artist.to_string()),
                    ..Default::default()
                },
            }),
        }
    }

    #[test]
    fn clean_library_reports_nothing() {
        let records = vec![
            track("/m/a/1.flac", "h1", "Album A", "X"),
            track("/m/a/2.flac", "h2", "Album A", "X"),
        ];
        let report = build_report("/m", &records, &DebugTrace::new(false));

        assert_eq!(report.album_count, 1);
        assert_eq!(report.track_count, 2);
        assert_eq!(report.total_size_bytes, 2048);
        assert_eq!(report.total_duration_secs, 120.0);
        assert_eq!(report.health, 100);
        assert!(report.albums.is_empty());
        assert_eq!(report.debug, None);
    }

    #[test]
    fn albums_are_ordered_by_display_name() {
        let records = vec![
            track("/m/1/1.flac", "h1", "zebra", "X"),
            track("/m/1/2.flac", "h1", "zebra", "X"),
            track("/m/2/1.flac", "h2", "Apple", "X"),
            track("/m/2/2.flac", "h2", "Apple", "X"),
            track("/m/3/1.flac", "h3", "mango", "X"),
            track("/m/3/2.flac", "h3", "mango", "X"),
        ];
        let report = build_report("/m", &records, &DebugTrace::new(false));
        let names: Vec<_> = report.albums.iter().map(|a| a.album_name.as_str()).collect();

        assert_eq!(names, vec!["Apple", "mango", "zebra"]);
        assert_eq!(report.health, 50);
    }

    #[test]
    fn same_named_albums_keep_scan_order() {
        // Untagged folders all display as "Unknown Album"
        let records = vec![
            track("/m/zeta/a.flac", "h1", "", ""),
            track("/m/zeta/b.flac", "h1", "", ""),
            track("/m/alpha/y.flac", "h2", "", ""),
            track("/m/alpha/z.flac", "h2", "", ""),
        ];
        let report = build_report("/m", &records, &DebugTrace::new(false));
        let keys: Vec<_> = report.albums.iter().map(|a| a.key.as_str()).collect();

        assert_eq!(keys, vec!["/m/zeta", "/m/alpha"]);
        assert!(report.albums.iter().all(|a| a.album_name == "Unknown Album"));
    }

    #[test]
    fn failed_records_are_excluded_from_scoring() {
        let mut broken = track("/m/a/3.mp3", "h3", "", "");
        broken.outcome = TrackOutcome::Failed(DecodeFailure::Mp3Unreadable);
        broken.size_bytes = 500;
        let records = vec![
            track("/m/a/1.flac", "h1", "Album A", "X"),
            broken,
            track("/m/a/2.flac", "h2", "Album A", "X"),
        ];

        let mut trace = DebugTrace::new(true);
        trace.push("[debug] entering: /m (depth=0)".into());
        let report = build_report("/m", &records, &trace);

        assert_eq!(report.album_count, 1);
        assert_eq!(report.track_count, 2);
        assert_eq!(report.total_size_bytes, 2048);
        assert_eq!(report.health, 100);
        assert_eq!(
            report.debug,
            Some(vec![
                "[debug] entering: /m (depth=0)".to_string(),
                "[debug] skipped 1 unreadable file(s), 500.00 B".to_string(),
            ])
        );
    }

    #[test]
    fn crit_album_keeps_artist_name() {
        let mut bad = track("/m/a/1.mp3", "h1", "Album A", "Slint");
        if let TrackOutcome::Decoded(d) = &mut bad.outcome {
            d.container = ContainerKind::Mp3;
            d.stream.duration_secs = None;
        }
        let records = vec![bad, track("/m/a/2.mp3", "h2", "Album A", "Slint")];
        let report = build_report("/m", &records, &DebugTrace::new(false));

        assert_eq!(report.albums.len(), 1);
        assert_eq!(report.albums[0].diagnostics.severity, Severity::Crit);
        assert_eq!(report.albums[0].artist_name, "Slint");
        assert_eq!(report.health, 0);
    }
}
