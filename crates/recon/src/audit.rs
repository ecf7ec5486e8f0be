//! The audit file: every match decision of the run, for curator review.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::ReconError;
use crate::model::MatchResult;

pub const AUDIT_HEADER: [&str; 10] = [
    "our_school_name",
    "our_city",
    "matched_school_name",
    "matched_city",
    "matched_county",
    "matched_region",
    "confidence_score",
    "match_method",
    "status",
    "comment",
];

const AUDIT_DELIMITER: u8 = b';';

/// Group by method (manual first, unmatched last), then by school name.
pub fn sort_for_audit(results: &[MatchResult]) -> Vec<&MatchResult> {
    let mut sorted: Vec<&MatchResult> = results.iter().collect();
    sorted.sort_by(|a, b| {
        a.match_method
            .cmp(&b.match_method)
            .then_with(|| a.our_school_name.cmp(&b.our_school_name))
    });
    sorted
}

/// Write all results, sorted, as `;`-delimited text.
pub fn write_audit<W: Write>(writer: W, results: &[MatchResult]) -> Result<(), ReconError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(AUDIT_DELIMITER)
        .from_writer(writer);

    wtr.write_record(AUDIT_HEADER)?;
    for r in sort_for_audit(results) {
        let score = r.confidence_score.map(|s| format!("{s:.1}")).unwrap_or_default();
        wtr.write_record([
            r.our_school_name.as_str(),
            r.our_city.as_str(),
            r.matched_school_name.as_deref().unwrap_or(""),
            r.matched_city.as_deref().unwrap_or(""),
            r.matched_county.as_deref().unwrap_or(""),
            r.matched_region.as_deref().unwrap_or(""),
            score.as_str(),
            r.match_method.as_str(),
            r.status.as_str(),
            r.comment.as_str(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the audit file at `path`, creating parent directories.
pub fn generate_audit(results: &[MatchResult], path: &Path) -> Result<(), ReconError> {
    let io_err = |source| ReconError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    write_audit(file, results)?;

    let applied = results.iter().filter(|r| r.is_applied()).count();
    info!(
        "audit written to {}: {} applied, {} not applied",
        path.display(),
        applied,
        results.len() - applied
    );
    Ok(())
}
