//! Exporter: writes the rendered LaTeX to a scratch file, drives the
//! external compiler and moves the finished PDF to its final name.
//!
//! Scratch names inside the output directory are fixed (`temp.tex`,
//! `temp.pdf`, `compile.log`), so exactly one run may use a given output
//! directory at a time.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::Config;
use crate::error::Error;

const TEX_NAME: &str = "temp.tex";
const PDF_NAME: &str = "temp.pdf";
const CAPTURE_NAME: &str = "compile.log";
/// Byproducts removed after a successful compile.
const SCRATCH_NAMES: &[&str] = &["temp.aux", "temp.log", TEX_NAME, CAPTURE_NAME];

/// How many trailing lines of the capture file make it into the diagnostic.
const DIAGNOSTIC_LINES: usize = 30;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Compile `tex_source` and deliver the PDF as `output_filename` inside the
/// configured output directory. On failure every scratch file stays on disk
/// for inspection; on success the scratch files are removed best-effort.
pub fn compile_pdf(
    config: &Config,
    tex_source: &str,
    output_filename: &str,
) -> Result<PathBuf, Error> {
    fs::create_dir_all(&config.output_dir)?;

    let tex_path = config.output_dir.join(TEX_NAME);
    fs::write(&tex_path, tex_source)?;

    info!("compiling {output_filename}...");
    let capture_path = config.output_dir.join(CAPTURE_NAME);
    let status = run_compiler(config, &tex_path, &capture_path)?;

    if !status.success() {
        return Err(Error::CompilerFailed {
            status,
            diagnostic: capture_tail(&capture_path),
        });
    }

    let generated = config.output_dir.join(PDF_NAME);
    if !generated.exists() {
        return Err(Error::MissingArtifact(generated));
    }
    let final_pdf = config.output_dir.join(output_filename);
    replace_file(&generated, &final_pdf)?;

    if config.keep_tex {
        replace_file(&tex_path, &final_pdf.with_extension("tex"))?;
    }
    cleanup_scratch(&config.output_dir);

    info!("wrote {}", final_pdf.display());
    Ok(final_pdf)
}

/// Spawn the compiler with its output captured to `capture_path` and wait
/// for it, bounded by the configured timeout. A spawn failure with
/// `NotFound` means the executable itself is missing, reported as its own
/// category; timeout expiry kills the child.
fn run_compiler(config: &Config, tex_path: &Path, capture_path: &Path) -> Result<ExitStatus, Error> {
    let capture = File::create(capture_path)?;
    let capture_err = capture.try_clone()?;

    let mut child = Command::new(&config.compiler)
        .arg("-o")
        .arg(&config.output_dir)
        .arg(tex_path)
        .stdin(Stdio::null())
        .stdout(Stdio::from(capture))
        .stderr(Stdio::from(capture_err))
        .spawn()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::CompilerNotFound(config.compiler.clone())
            } else {
                Error::Io(e)
            }
        })?;

    wait_with_timeout(&mut child, config.compile_timeout)
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, Error> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::CompilerTimeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Tail of the compiler output, for the failure diagnostic.
fn capture_tail(capture_path: &Path) -> String {
    let Ok(content) = fs::read_to_string(capture_path) else {
        return format!("(no compiler output captured, see {})", capture_path.display());
    };
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}

/// Remove-then-rename: the destination may already exist from a previous
/// run and `rename` alone is not enough everywhere.
fn replace_file(from: &Path, to: &Path) -> Result<(), Error> {
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(Error::Io(e)),
    }
    fs::rename(from, to)?;
    Ok(())
}

/// Best-effort removal of known byproducts; an already-absent file is fine,
/// anything else is only worth a warning.
fn cleanup_scratch(output_dir: &Path) {
    for name in SCRATCH_NAMES {
        let path = output_dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("could not remove {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_file_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("from.pdf");
        let to = dir.path().join("to.pdf");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        replace_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }

    #[test]
    fn replace_file_works_without_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("from.pdf");
        let to = dir.path().join("to.pdf");
        fs::write(&from, b"new").unwrap();

        replace_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"new");
    }

    #[test]
    fn cleanup_ignores_absent_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("temp.aux"), b"aux").unwrap();
        cleanup_scratch(dir.path());
        assert!(!dir.path().join("temp.aux").exists());
        // No temp.log/temp.tex existed and that was fine.
    }

    #[test]
    fn capture_tail_keeps_last_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile.log");
        let content: String = (0..100).map(|i| format!("line {i}\n")).collect();
        fs::write(&path, content).unwrap();

        let tail = capture_tail(&path);
        assert!(tail.starts_with("line 70"));
        assert!(tail.ends_with("line 99"));
    }
}
