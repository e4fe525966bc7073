use crate::output::{self, FileReport};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use weld::domain::config::WeldConfig;
use weld::initializer::Scanner;
use weld::kernel::source::load_document;

/// Scans every file and writes the result to stdout.
///
/// Exit status is `1` when a file cannot be loaded, or with `strict` when any
/// directive source failed.
///
/// # Errors
/// Only when stdout cannot be written.
pub fn run(cfg: &WeldConfig, files: &[PathBuf], strict: bool, json: bool) -> anyhow::Result<ExitCode> {
    let reports: Vec<FileReport> = files.iter().map(|path| scan_file(cfg, path.clone())).collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        output::write_json(&mut out, &reports)?;
    } else {
        output::write_text(&mut out, &reports)?;
    }
    out.flush()?;

    let unreadable = reports.iter().filter(|r| r.error.is_some()).count();
    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    info!(files = reports.len(), unreadable, failures, "Scan complete");

    Ok(if unreadable > 0 || (strict && failures > 0) { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Dry run of the ready scan for one file: no registry, nothing invoked.
pub fn scan_file(cfg: &WeldConfig, path: PathBuf) -> FileReport {
    let mut doc = match load_document(&path) {
        Ok(doc) => doc,
        Err(error) => {
            warn!(path = %path.display(), "{error}");
            return FileReport::unreadable(path, &error);
        },
    };

    let root = doc.root();
    let scan = Scanner::new(&cfg.initializer).scan(&mut doc, root);
    for failure in &scan.failures {
        warn!(path = %path.display(), "{failure}");
    }
    FileReport::new(path, &doc, scan)
}
