pub mod format;

use crate::audit::{AlbumReport, ScanReport};
use format::{format_bytes, format_duration};

/// Whole output when no recognized track was found.
pub const NO_MUSIC: &str = "Couldn't find any music files with current parameters.\n";
pub const NO_ISSUES: &str = "No warnings, critical issues, or informational notes were detected.";

const HEALTH_BAR_WIDTH: usize = 40;

const LEGEND: [&str; 3] = [
    "  [CRIT] Serious problems that likely prevent proper playback or visibility.",
    "  [WARN] Inconsistencies that may cause confusion or uneven playback/organization.",
    "  [INFO] Helpful notes that are not problems (for example, multiple file formats).",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show duration and size on each album header.
    pub per_album: bool,
    /// Hide the albums/tracks/size/duration line.
    pub no_quick_stats: bool,
}

/// Render the plain-text report. Output depends only on `report` and
/// `options`, so identical scans render byte-identical text.
pub fn render(report: &ScanReport, options: &RenderOptions) -> String {
    if report.track_count == 0 {
        return NO_MUSIC.to_string();
    }

    let title = format!("\n\"{}\" Library Scan", report.root);
    let health_line = health_bar(report.health);
    let mut lines: Vec<String> = vec![title.clone()];

    if options.no_quick_stats {
        let sep = separator(&health_line);
        lines.push(sep.clone());
        lines.push(health_line);
        lines.push(sep);
    } else {
        let quick_line = format!(
            "Albums: {}  Tracks: {}  Size: {}  Duration: {}",
            report.album_count,
            report.track_count,
            format_bytes(report.total_size_bytes),
            format_duration(report.total_duration_secs)
        );
        let sep = separator(&quick_line);
        lines.push(sep.clone());
        lines.push(health_line);
        lines.push(quick_line);
        lines.push(sep);
    }
    lines.push("\n".to_string());

    if report.albums.is_empty() {
        if options.no_quick_stats {
            lines.push(separator(&title));
        }
        lines.push(NO_ISSUES.to_string());
    } else {
        lines.extend(report.albums.iter().map(|a| album_block(a, options)));
        lines.push(String::new());
        lines.push("Legend".to_string());
        lines.extend(LEGEND.iter().map(|l| l.to_string()));
    }

    if let Some(trace) = report.debug.as_ref().filter(|t| !t.is_empty()) {
        lines.push(String::new());
        lines.push("Debug".to_string());
        lines.extend(trace.iter().cloned());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `Health: [====....] NN%`, filled in proportion to the percentage.
pub fn health_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = HEALTH_BAR_WIDTH * percent / 100;
    format!(
        "Health: [{}{}] {}%",
        "=".repeat(filled),
        ".".repeat(HEALTH_BAR_WIDTH - filled),
        percent
    )
}

fn separator(line: &str) -> String {
    "=".repeat(line.chars().count())
}

fn album_block(album: &AlbumReport, options: &RenderOptions) -> String {
    let diag = &album.diagnostics;
    let tag = diag.severity.tag();
    let header = if options.per_album {
        format!(
            "{} {} ({}) | Duration: {}, Size {}",
            tag,
            album.album_name,
            album.artist_name,
            format_duration(diag.duration_secs),
            format_bytes(diag.size_bytes)
        )
    } else {
        format!("{} {} ({}):", tag, album.album_name, album.artist_name)
    };

    let mut block = header;
    for message in &diag.messages {
        block.push_str("\n    - ");
        block.push_str(message);
    }
    block.push('\n');
    block
}
