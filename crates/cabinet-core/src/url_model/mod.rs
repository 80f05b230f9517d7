//! Output file naming for downloaded attachments.
//!
//! An attachment URL such as `/excel/2023/oo1_2023_ORG.xlsx` is saved as the
//! last two path segments joined with `_`, with the report token stripped:
//! `2023_2023_ORG.xlsx` for report `oo1`.

mod path;
mod sanitize;

pub use path::last_path_segments;
pub use sanitize::sanitize_filename;

use thiserror::Error;
use url::Url;

use crate::config::ReportSelection;

/// A download URL that cannot be turned into an output file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("download URL has fewer than two path segments: {0}")]
    TooFewSegments(String),
    #[error("download URL yields no usable file name ({name:?}): {url}")]
    UnusableName { url: String, name: String },
}

/// `{second_to_last}_{last}` with every `{report}_` removed, made filesystem-safe.
///
/// Segments are percent-decoded first so names match what the portal shows.
///
/// # Examples
///
/// - `https://x.test/object/excel/report2023_ORGNAME.xlsx`, report `report2023` → `excel_ORGNAME.xlsx`
/// - `https://x.test/excel/2023/oo1_School.xlsx`, report `oo1` → `2023_School.xlsx`
pub fn report_file_name(url: &Url, report: &str) -> Result<String, LinkError> {
    let [parent, file] = last_path_segments(url)
        .ok_or_else(|| LinkError::TooFewSegments(url.to_string()))?;

    let joined = format!("{parent}_{file}");
    let stripped = if report.is_empty() {
        joined
    } else {
        joined.replace(&format!("{report}_"), "")
    };

    let name = sanitize_filename(&stripped);
    if name.is_empty() || name == "." || name == ".." {
        return Err(LinkError::UnusableName {
            url: url.to_string(),
            name,
        });
    }
    Ok(name)
}

/// Folder a run saves into: `{report}_{year}`, made filesystem-safe.
pub fn report_folder_name(selection: &ReportSelection) -> String {
    sanitize_filename(&selection.folder_name())
}
