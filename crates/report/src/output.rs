//! Finished report bytes, file naming and delivery

use crate::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Report types, named by their file-name slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Birthday,
    Wedding,
    CongregationRegister,
}

impl ReportKind {
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::Birthday => "birthday",
            ReportKind::Wedding => "wedding",
            ReportKind::CongregationRegister => "congregation_register",
        }
    }
}

/// What the caller does with the finished document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputAction {
    /// Open in a viewer
    View,
    /// Open and send to the print dialog
    Print,
    /// Save to disk
    #[default]
    Download,
}

impl OutputAction {
    /// `Content-Disposition` value for serving the document
    pub fn disposition(self, file_name: &str) -> String {
        match self {
            OutputAction::View | OutputAction::Print => format!("inline; filename=\"{file_name}\""),
            OutputAction::Download => format!("attachment; filename=\"{file_name}\""),
        }
    }
}

impl FromStr for OutputAction {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(OutputAction::View),
            "print" => Ok(OutputAction::Print),
            "download" | "" => Ok(OutputAction::Download),
            other => Err(ReportError::InvalidAction(other.to_string())),
        }
    }
}

/// A rendered report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub action: OutputAction,
    pub pages: usize,
}

impl ReportOutput {
    pub const MIME_TYPE: &'static str = "application/pdf";

    pub fn disposition(&self) -> String {
        self.action.disposition(&self.file_name)
    }

    /// Write the document into `dir` under its file name
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// `{reportType}_{churchShortName}_{dateOrYear}.pdf`
pub fn file_name(kind: ReportKind, church_short_name: &str, date_or_year: &str) -> String {
    format!(
        "{}_{}_{}.pdf",
        kind.slug(),
        sanitize(church_short_name),
        sanitize(date_or_year)
    )
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '_' => '-',
            c if c.is_whitespace() || c.is_control() => '-',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}
