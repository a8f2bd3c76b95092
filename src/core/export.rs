// ReportScope - core/export.rs
//
// CSV and JSON export of the currently displayed logs.
// Core layer: writes to any Write trait object.

use crate::core::model::Log;
use crate::util::constants::MAX_EXPORT_LOGS;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

fn check_size(logs: &[Log]) -> Result<(), ExportError> {
    if logs.len() > MAX_EXPORT_LOGS {
        return Err(ExportError::TooManyEntries {
            count: logs.len(),
            max: MAX_EXPORT_LOGS,
        });
    }
    Ok(())
}

/// Export logs to CSV format.
///
/// Writes: severity, report, message
pub fn export_csv<W: Write>(
    logs: &[Log],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(logs)?;
    let csv_err = |source| ExportError::Csv {
        path: export_path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["severity", "report", "message"])
        .map_err(csv_err)?;

    for log in logs {
        csv_writer
            .write_record([
                log.severity.as_str(),
                log.parent_id.as_deref().unwrap_or(""),
                &log.message,
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(path = %export_path.display(), count = logs.len(), "Logs exported to CSV");
    Ok(logs.len())
}

/// Export logs to JSON format (array of objects).
pub fn export_json<W: Write>(
    logs: &[Log],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    check_size(logs)?;
    serde_json::to_writer_pretty(writer, logs).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %export_path.display(), count = logs.len(), "Logs exported to JSON");
    Ok(logs.len())
}
