use crate::cluster::AnalysisResult;
use crate::error::Error;
use chrono::{Local, TimeZone};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size with 1024-based units. Bytes print as an integer.
pub fn fmt_size(size_bytes: u64) -> String {
    let mut value = size_bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", size_bytes, SIZE_UNITS[0])
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[unit])
    }
}

/// Local wall-clock time of a Unix timestamp, `-` if it cannot be represented.
pub fn fmt_time(unix_secs: i64) -> String {
    match Local.timestamp_opt(unix_secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

pub const CSV_HEADERS: [&str; 7] = [
    "group_id",
    "is_latest_by_size",
    "file_name",
    "modified",
    "size",
    "path",
    "shared_snippets",
];

/// Write one CSV row per grouped file. The file starts with a UTF-8 BOM so spreadsheet
/// tools pick the right encoding for CJK names.
pub fn write_csv(result: &AnalysisResult, output: &Path) -> Result<(), Error> {
    let mut file = File::create(output)?;
    file.write_all(b"\xEF\xBB\xBF")?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(CSV_HEADERS)?;

    for (gid, group) in result.groups.iter().enumerate() {
        let snippets = group.shared_snippets.join("|");
        let group_id = (gid + 1).to_string();
        for f in &group.files {
            wtr.write_record([
                group_id.as_str(),
                if f.is_latest_by_size { "yes" } else { "no" },
                f.name.as_str(),
                f.modified.as_str(),
                f.size_text.as_str(),
                f.path.as_str(),
                snippets.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    info!("Wrote {} groups to {}", result.group_count, output.display());
    Ok(())
}

pub fn write_json(result: &AnalysisResult, output: &Path) -> Result<(), Error> {
    let file = File::create(output)?;
    serde_json::to_writer_pretty(file, result)?;
    info!("Wrote analysis JSON to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_size_units() {
        assert_eq!(fmt_size(0), "0 B");
        assert_eq!(fmt_size(1023), "1023 B");
        assert_eq!(fmt_size(1536), "1.50 KB");
        assert_eq!(fmt_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(fmt_size(3 * 1024u64.pow(5)), "3072.00 TB");
    }

    #[test]
    fn test_fmt_time_shape() {
        let text = fmt_time(1_700_000_000);
        assert_eq!(text.len(), 19);
        assert_eq!(&text[4..5], "-");
        assert_eq!(fmt_time(i64::MAX), "-");
    }
}
