use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Output file '{}' already exists.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No clipboard tool found (tried {0})")]
    NoClipboard(String),

    #[error("Clipboard tool '{tool}' failed: {message}")]
    Clipboard { tool: String, message: String },
}

/// Write the report to a new file, creating parent directories.
/// Never overwrites: an existing target is an error.
pub fn write_report(path: &Path, text: &str) -> Result<(), OutputError> {
    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(OutputError::AlreadyExists(path.to_path_buf()));
        }
        Err(e) => return Err(write_err(e)),
    };
    file.write_all(text.as_bytes()).map_err(write_err)?;
    log::debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

type ClipboardTool = (&'static str, &'static [&'static str]);

/// Clipboard helpers in preference order for the current platform.
#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[("pbcopy", &[])];
#[cfg(windows)]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[("clip", &[])];
#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Copy text to the system clipboard by piping it into the platform's
/// clipboard tool. The first tool that can be spawned wins.
pub fn copy_to_clipboard(text: &str) -> Result<(), OutputError> {
    for (tool, args) in CLIPBOARD_TOOLS {
        match spawn_tool(tool, args) {
            Ok(child) => return feed(child, tool, text),
            Err(e) => log::debug!("Clipboard tool {} unavailable: {}", tool, e),
        }
    }

    let tried: Vec<&str> = CLIPBOARD_TOOLS.iter().map(|(tool, _)| *tool).collect();
    Err(OutputError::NoClipboard(tried.join(", ")))
}

/// Output streams go to null: wl-copy and xclip leave a background process
/// holding the selection, and it inherits any pipe we hand out.
fn spawn_tool(program: &str, args: &[&str]) -> io::Result<Child> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

fn feed(mut child: Child, tool: &str, text: &str) -> Result<(), OutputError> {
    let clipboard_err = |message: String| OutputError::Clipboard {
        tool: tool.to_string(),
        message,
    };

    // Dropping stdin closes the pipe so the tool sees EOF
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| clipboard_err(e.to_string()))?;
    }
    let status = child.wait().map_err(|e| clipboard_err(e.to_string()))?;
    if !status.success() {
        return Err(clipboard_err(format!("exited with {status}")));
    }
    log::debug!("Copied {} bytes with {}", text.len(), tool);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_new_file_with_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/nested/scan.txt");

        write_report(&path, "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.txt");
        std::fs::write(&path, "original").unwrap();

        let err = write_report(&path, "new").unwrap_err();
        assert!(matches!(err, OutputError::AlreadyExists(_)));
        assert_eq!(
            err.to_string(),
            format!("Output file '{}' already exists.", path.display())
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    /// Stand-in clipboard tool: saves stdin next to itself, then leaves a
    /// long-lived background child behind the way wl-copy and xclip do.
    #[cfg(unix)]
    fn daemonizing_tool(dir: &Path, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-copy");
        let body = format!(
            "#!/bin/sh\ncat > \"$(dirname \"$0\")/copied.txt\"\nsleep 10 &\nexit {exit_code}\n"
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn clipboard_returns_without_waiting_for_background_owner() {
        let dir = tempdir().unwrap();
        let script = daemonizing_tool(dir.path(), 0);
        let program = script.to_str().unwrap();

        let started = std::time::Instant::now();
        let child = spawn_tool(program, &[]).unwrap();
        feed(child, program, "report\n").unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("copied.txt")).unwrap(),
            "report\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn clipboard_tool_failure_is_reported() {
        let dir = tempdir().unwrap();
        let script = daemonizing_tool(dir.path(), 3);
        let program = script.to_str().unwrap();

        let child = spawn_tool(program, &[]).unwrap();
        let err = feed(child, program, "report\n").unwrap_err();
        assert!(matches!(err, OutputError::Clipboard { .. }));
    }

    #[test]
    fn missing_tool_fails_to_spawn() {
        assert!(spawn_tool("/nonexistent/clipboard-tool", &[]).is_err());
    }
}
