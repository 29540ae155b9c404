//! Export formatting for crawl results
//!
//! Three formats are supported:
//! - a line list, optionally prefixed with `[where]` and `[source]`
//! - a JSON array of `{url, source, where}` objects
//! - CSV with the header `URL,Source,Where`

use crate::config::{OutputConfig, OutputFormat};
use crate::output::reference::{FoundReference, SourceKind};
use crate::HarvestError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// JSON shape of one exported reference
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    url: &'a str,
    source: SourceKind,
    #[serde(rename = "where")]
    origin: &'a str,
}

impl<'a> From<&'a FoundReference> for ExportRecord<'a> {
    fn from(reference: &'a FoundReference) -> Self {
        Self {
            url: reference.url.as_str(),
            source: reference.source_kind,
            origin: reference.origin_str(),
        }
    }
}

/// Formats one reference as a line of the line-list format
pub fn format_line(reference: &FoundReference, show_source: bool, show_where: bool) -> String {
    let mut line = reference.url.to_string();
    if show_source {
        line = format!("[{}] {}", reference.source_kind, line);
    }
    let origin = reference.origin_str();
    if show_where && !origin.is_empty() {
        line = format!("[{}] {}", origin, line);
    }
    line
}

/// Formats references as a newline-separated list
pub fn format_lines(references: &[FoundReference], show_source: bool, show_where: bool) -> String {
    references
        .iter()
        .map(|reference| format_line(reference, show_source, show_where))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats references as a pretty-printed JSON array
pub fn format_json(references: &[FoundReference]) -> Result<String, HarvestError> {
    let records: Vec<ExportRecord<'_>> = references.iter().map(ExportRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Formats references as CSV with a `URL,Source,Where` header
pub fn format_csv(references: &[FoundReference]) -> Result<String, HarvestError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["URL", "Source", "Where"])?;
    for reference in references {
        writer.write_record([
            reference.url.as_str(),
            reference.source_kind.label(),
            reference.origin_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| HarvestError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Renders references in the configured format
pub fn render(references: &[FoundReference], config: &OutputConfig) -> Result<String, HarvestError> {
    match config.format {
        OutputFormat::Lines => Ok(format_lines(
            references,
            config.show_source,
            config.show_where,
        )),
        OutputFormat::Json => format_json(references),
        OutputFormat::Csv => format_csv(references),
    }
}

/// Renders references and writes them to `output_path`
///
/// # Arguments
///
/// * `references` - The references to export
/// * `config` - Output format options
/// * `output_path` - Path where the export should be written
pub fn export_to_file(
    references: &[FoundReference],
    config: &OutputConfig,
    output_path: &Path,
) -> Result<(), HarvestError> {
    let mut rendered = render(references, config)?;
    if !rendered.ends_with('\n') && !rendered.is_empty() {
        rendered.push('\n');
    }

    let mut file = File::create(output_path)?;
    file.write_all(rendered.as_bytes())?;

    Ok(())
}
