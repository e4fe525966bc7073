use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use weld::dom::Document;
use weld::initializer::{Origin, Scan, Target};

#[derive(Debug, Serialize)]
pub struct DirectiveLine {
    pub component: String,
    /// `global`, or a short label of the target element.
    pub target: String,
    pub origin: Origin,
    pub config: Value,
}

#[derive(Debug, Serialize)]
pub struct FailureLine {
    pub kind: &'static str,
    pub origin: String,
    pub message: String,
}

/// What one file would dispatch.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub directives: Vec<DirectiveLine>,
    pub failures: Vec<FailureLine>,
}

impl FileReport {
    #[must_use]
    pub fn new(file: PathBuf, doc: &Document, scan: Scan) -> Self {
        let directives = scan
            .directives
            .into_iter()
            .map(|d| DirectiveLine {
                target: match d.target {
                    Target::Element(node) => doc.describe(node),
                    Target::Global => "global".to_owned(),
                },
                component: d.component,
                origin: d.origin,
                config: d.config,
            })
            .collect();
        let failures = scan
            .failures
            .into_iter()
            .map(|f| FailureLine {
                kind: f.kind().into(),
                origin: f.origin.to_string(),
                message: f.error.to_string(),
            })
            .collect();
        Self { file, error: None, directives, failures }
    }

    #[must_use]
    pub fn unreadable(file: PathBuf, error: &dyn std::fmt::Display) -> Self {
        Self { file, error: Some(error.to_string()), directives: Vec::new(), failures: Vec::new() }
    }
}

/// # Errors
/// When `out` cannot be written.
pub fn write_text(out: &mut impl Write, reports: &[FileReport]) -> io::Result<()> {
    for report in reports {
        if let Some(error) = &report.error {
            writeln!(out, "{}: error: {error}", report.file.display())?;
            continue;
        }
        writeln!(
            out,
            "{}: {} directive(s), {} failure(s)",
            report.file.display(),
            report.directives.len(),
            report.failures.len()
        )?;
        for d in &report.directives {
            writeln!(out, "  {} -> {} ({}) {}", d.component, d.target, d.origin, d.config)?;
        }
        for f in &report.failures {
            writeln!(out, "  ! [{}] {}: {}", f.kind, f.origin, f.message)?;
        }
    }
    Ok(())
}

/// # Errors
/// When `out` cannot be written.
pub fn write_json(out: &mut impl Write, reports: &[FileReport]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, reports)?;
    writeln!(out)
}
