pub mod decode;
pub mod hash;
pub mod metadata;

use crate::is_supported;
use crate::models::TrackRecord;
use decode::TagDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("'{}' is not a valid directory.", .0.display())]
    InvalidRoot(PathBuf),
}

/// Scan parameters. Depth counts from the root directory (depth 0).
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub debug: bool,
    pub show_progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            debug: false,
            show_progress: false,
        }
    }
}

/// Human-readable notes gathered while scanning, appended to the report
/// when debug output is requested. Pushes are dropped when disabled.
#[derive(Debug, Default, Clone)]
pub struct DebugTrace {
    enabled: bool,
    lines: Vec<String>,
}

impl DebugTrace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.enabled {
            self.lines.push(line);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

pub struct ScanResult {
    /// Every candidate file, sorted by case-folded file name.
    pub records: Vec<TrackRecord>,
    pub trace: DebugTrace,
}

/// Collect candidate audio files under `root`. Directories down to
/// `max_depth` are listed; deeper ones are never entered.
pub fn collect_candidates(root: &Path, max_depth: usize, trace: &mut DebugTrace) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Files inside a directory at depth d sit at walkdir depth d + 1
    let walker = WalkDir::new(root)
        .follow_links(true)
        .max_depth(max_depth.saturating_add(1))
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .unwrap_or(root)
                    .display()
                    .to_string();
                let missing = e
                    .io_error()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
                log::warn!("Skipping {}: {}", path, e);
                if missing {
                    trace.push(format!("[debug] not found: {path}"));
                } else {
                    trace.push(format!("[debug] skipped: {path} ({e})"));
                }
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if entry.depth() <= max_depth {
                trace.push(format!(
                    "[debug] entering: {} (depth={})",
                    entry.path().display(),
                    entry.depth()
                ));
            } else {
                trace.push(format!(
                    "[debug] depth limit reached at: {}",
                    entry.path().display()
                ));
            }
            continue;
        }

        if entry.file_type().is_file() && is_supported(entry.path()) {
            candidates.push(entry.into_path());
        }
    }

    candidates
}

/// Walk `root`, decode every candidate and return the normalized records.
pub fn scan(
    root: &Path,
    options: &ScanOptions,
    decoder: &dyn TagDecoder,
) -> std::result::Result<ScanResult, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.to_path_buf()));
    }

    let mut trace = DebugTrace::new(options.debug);
    let candidates = collect_candidates(root, options.max_depth, &mut trace);
    let total = candidates.len() as u64;
    log::info!("Found {} candidate files under {}", total, root.display());

    let pb = if options.show_progress && total > 0 {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::with_template("Scanning: [{bar:40}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>."));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::with_capacity(candidates.len());
    let mut failed = 0u64;

    for path in &candidates {
        let record = metadata::read_track(decoder, path);
        if let Some(failure) = record.failure() {
            failed += 1;
            trace.push(format!("[debug] {}: {}", failure.label(), path.display()));
        }
        records.push(record);
        pb.inc(1);
    }

    pb.finish_and_clear();

    // Stable: equal names keep traversal order
    records.sort_by_key(|r| r.file_name.to_lowercase());

    log::info!(
        "Scan complete: {} files, {} unreadable",
        records.len(),
        failed
    );

    Ok(ScanResult { records, trace })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerKind, StreamInfo};
    use decode::{DecodeError, DecodedFile};
    use tempfile::tempdir;

    /// Treats every file as a tagless flac, or as unrecognized when it
    /// contains the word "junk".
    struct StubDecoder;

    impl TagDecoder for StubDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedFile, DecodeError> {
            let bytes = std::fs::read(path).map_err(|e| DecodeError::Unreadable(e.to_string()))?;
            if bytes.windows(4).any(|w| w == b"junk") {
                return Err(DecodeError::Unrecognized);
            }
            Ok(DecodedFile {
                kind: ContainerKind::Flac,
                stream: StreamInfo::default(),
                tags: Vec::new(),
                id3_version: None,
            })
        }
    }

    fn touch(path: &Path, contents: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn only_supported_extensions_are_candidates() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.mp3"), b"1");
        touch(&dir.path().join("b.FLAC"), b"2");
        touch(&dir.path().join("cover.jpg"), b"3");
        touch(&dir.path().join("notes.txt"), b"4");

        let found = collect_candidates(dir.path(), 5, &mut DebugTrace::new(false));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn depth_bound_is_inclusive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("root.mp3"), b"0");
        touch(&dir.path().join("d1/one.mp3"), b"1");
        touch(&dir.path().join("d1/d2/two.mp3"), b"2");

        let mut trace = DebugTrace::new(true);
        let found = collect_candidates(dir.path(), 1, &mut trace);
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        // d2 sits at depth 2 = max_depth + 1 and is never entered
        assert_eq!(names, vec!["one.mp3", "root.mp3"]);
        assert!(trace.lines().iter().any(|l| l.starts_with("[debug] depth limit reached at:")));
    }

    #[test]
    fn depth_zero_scans_root_only() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("root.ogg"), b"0");
        touch(&dir.path().join("sub/deeper.ogg"), b"1");

        let found = collect_candidates(dir.path(), 0, &mut DebugTrace::new(false));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn trace_records_directories_entered() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("album/01.mp3"), b"1");

        let mut trace = DebugTrace::new(true);
        collect_candidates(dir.path(), 5, &mut trace);

        assert!(trace.lines()[0].ends_with("(depth=0)"));
        assert!(trace.lines().iter().any(|l| l.contains("album") && l.ends_with("(depth=1)")));
    }

    #[cfg(unix)]
    #[test]
    fn vanished_directory_is_traced_and_skipped() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("kept/01.mp3"), b"1");
        // Points at a directory that no longer exists
        std::os::unix::fs::symlink(dir.path().join("removed"), dir.path().join("gone")).unwrap();

        let mut trace = DebugTrace::new(true);
        let found = collect_candidates(dir.path(), 5, &mut trace);

        assert_eq!(found.len(), 1);
        assert!(trace
            .lines()
            .iter()
            .any(|l| l.starts_with("[debug] not found:") && l.ends_with("gone")));
    }

    #[test]
    fn disabled_trace_stays_empty() {
        let mut trace = DebugTrace::new(false);
        trace.push("[debug] anything".into());
        assert!(trace.lines().is_empty());
    }

    #[test]
    fn scan_rejects_missing_root() {
        let result = scan(
            Path::new("/nonexistent/library"),
            &ScanOptions::default(),
            &StubDecoder,
        );
        assert!(matches!(result, Err(ScanError::InvalidRoot(_))));
    }

    #[test]
    fn scan_sorts_by_case_folded_name_and_keeps_failures() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b/Zed.flac"), b"z");
        touch(&dir.path().join("a/apple.flac"), b"a");
        touch(&dir.path().join("a/Mango.flac"), b"junk");

        let options = ScanOptions {
            debug: true,
            ..Default::default()
        };
        let result = scan(dir.path(), &options, &StubDecoder).unwrap();
        let names: Vec<_> = result.records.iter().map(|r| r.file_name.as_str()).collect();

        assert_eq!(names, vec!["apple.flac", "Mango.flac", "Zed.flac"]);
        assert!(result.records[1].is_error());
        assert!(result.records[1].content_hash.is_some());
        assert!(result
            .trace
            .lines()
            .iter()
            .any(|l| l.starts_with("[debug] unrecognized:") && l.ends_with("Mango.flac")));
    }
}
