use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tagaudit::audit::build_report;
use tagaudit::config::AppConfig;
use tagaudit::output::{self, OutputError};
use tagaudit::report::{self, RenderOptions};
use tagaudit::scanner::{self, decode::LoftyDecoder, ScanOptions};

#[derive(Parser)]
#[command(
    name = "tagaudit",
    version,
    about = "Audit a music library's tags and report album inconsistencies"
)]
struct Cli {
    /// Root folder of the music library
    #[arg(short, long)]
    folder: PathBuf,

    /// Write the report to a file
    #[arg(long)]
    to_file: bool,

    /// Print the report to the terminal (with a progress bar while scanning)
    #[arg(short, long)]
    terminal: bool,

    /// Report file path for --to-file (default: config output_path or ./output.txt)
    #[arg(long)]
    output_path: Option<PathBuf>,

    /// Copy the report to the clipboard
    #[arg(short, long)]
    copy: bool,

    /// Append the scan trace to the report
    #[arg(short, long)]
    debug: bool,

    /// Subfolder levels to scan below the root (default: 5)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Show duration and size on each album header
    #[arg(long)]
    per_album: bool,

    /// Hide the albums/tracks/size/duration line
    #[arg(long)]
    no_quick_stats: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load();

    let root = std::path::absolute(&cli.folder)
        .with_context(|| format!("Failed to resolve {}", cli.folder.display()))?;
    if !root.is_dir() {
        fail(format_args!("'{}' is not a valid directory.", cli.folder.display()));
    }

    // CLI > config > defaults
    let options = ScanOptions {
        max_depth: cli.max_depth.unwrap_or_else(|| config.resolve_max_depth()),
        debug: cli.debug,
        show_progress: cli.terminal,
    };
    let render_options = RenderOptions {
        per_album: cli.per_album || config.per_album,
        no_quick_stats: cli.no_quick_stats || config.no_quick_stats,
    };
    log::info!("Scanning {} (max depth {})", root.display(), options.max_depth);

    let scanned = scanner::scan(&root, &options, &LoftyDecoder).context("Scan failed")?;
    let scan_report = build_report(&root.display().to_string(), &scanned.records, &scanned.trace);
    let text = report::render(&scan_report, &render_options);

    if cli.to_file {
        let path = cli
            .output_path
            .clone()
            .unwrap_or_else(|| config.resolve_output_path());
        match output::write_report(&path, &text) {
            Ok(()) => println!("File written to: {}", path.display()),
            Err(e @ OutputError::AlreadyExists(_)) => fail(e),
            Err(e) => return Err(e).context("Failed to save report"),
        }
    }

    if cli.copy {
        output::copy_to_clipboard(&text).context("Failed to copy report")?;
        println!("Music scan results copied to clipboard.");
    }

    // Terminal echo when asked, or when no other sink was chosen
    if cli.terminal || (!cli.to_file && !cli.copy) {
        print!("{text}");
    }

    Ok(())
}
