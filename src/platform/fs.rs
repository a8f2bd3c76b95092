// ReportScope - platform/fs.rs
//
// File access for report payloads and export targets.

use crate::core::report::{parse_report_json, Report};
use crate::util::constants::MAX_REPORT_FILE_SIZE;
use crate::util::error::{ExportError, ReportError};
use std::io::BufWriter;
use std::path::Path;

/// Read and normalise a report JSON file.
///
/// Files above `MAX_REPORT_FILE_SIZE` are refused before reading. Invalid
/// UTF-8 is replaced rather than rejected; only non-JSON content fails.
pub fn read_report_file(path: &Path) -> Result<Report, ReportError> {
    read_report_file_limited(path, MAX_REPORT_FILE_SIZE)
}

pub fn read_report_file_limited(path: &Path, max_size: u64) -> Result<Report, ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_size {
        return Err(ReportError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    let report = parse_report_json(&String::from_utf8_lossy(&bytes))?;
    tracing::info!(
        path = %path.display(),
        bytes = size,
        root = %report.message,
        "Report file loaded"
    );
    Ok(report)
}

/// Create (or truncate) an export target, buffered.
pub fn create_export_file(path: &Path) -> Result<BufWriter<std::fs::File>, ExportError> {
    std::fs::File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
