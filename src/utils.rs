//! Small shared helpers.
//!
//! Log-safe string truncation, the timestamp slug used in output file
//! names, and the writable-directory check performed before any analysis
//! runs.

use chrono::Local;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

/// Cap a string at `max` bytes for logging, appending how much was cut.
///
/// Provider payloads can be large; logs carry at most `max` bytes of them
/// followed by `…(+N bytes)`. When byte `max` falls inside a multibyte
/// character the cut backs up to the previous char boundary.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Current local time as `YYYYMMDD_HHMMSS`, shared by the report and
/// spreadsheet writers so one run produces one matching file pair.
pub fn timestamp_slug() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Create `path` if missing and verify it accepts writes.
///
/// Runs before any company is analyzed so a read-only output directory
/// fails the run up front rather than after the provider calls.
///
/// # Errors
///
/// Fails if the directory cannot be created or a probe file cannot be
/// written into it.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Probe with a sync write; std fs keeps the error surface simple.
    let probe = format!("{}/.write_probe", path.trim_end_matches('/'));
    match stdfs::File::create(&probe) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_passes_short_strings_through() {
        assert_eq!(truncate_for_log("risk summary", 64), "risk summary");
    }

    #[test]
    fn test_truncate_for_log_reports_cut_bytes() {
        let body = "x".repeat(300);
        let out = truncate_for_log(&body, 50);
        assert!(out.starts_with(&"x".repeat(50)));
        assert!(out.ends_with("…(+250 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_backs_up_to_char_boundary() {
        // 79 ASCII bytes, then a two-byte char straddling the cut point.
        let query = format!("{}é plc layoffs", "a".repeat(79));
        let out = truncate_for_log(&query, 80);
        assert!(out.starts_with(&"a".repeat(79)));
        assert!(out.ends_with("…(+14 bytes)"));
    }

    #[test]
    fn test_timestamp_slug_shape() {
        let slug = timestamp_slug();
        assert_eq!(slug.len(), 15);
        assert_eq!(slug.as_bytes()[8], b'_');
        assert!(slug.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("reports").join("out");
        let nested = nested.to_str().unwrap();

        ensure_writable_dir(nested).await.unwrap();
        assert!(std::path::Path::new(nested).is_dir());
    }
}
