//! JSON rendering of output documents.

use serde::Serialize;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Compact single-line JSON.
    #[default]
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

/// Trait for documents that can be rendered as JSON.
pub trait Exporter: Serialize {
    /// Render to a string in the given format.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rendered = match format {
            ExportFormat::Json => serde_json::to_string(self)?,
            ExportFormat::PrettyJson => serde_json::to_string_pretty(self)?,
        };
        Ok(rendered)
    }

    /// Render to a writer followed by a newline.
    fn export_to_writer<W: Write>(
        &self,
        writer: &mut W,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        let rendered = self.export_to_string(format)?;
        writeln!(writer, "{rendered}")?;
        writer.flush()?;
        Ok(())
    }
}

impl Exporter for crate::ForecastReport {}
impl Exporter for crate::TrainingReport {}
