//! Output file naming and persistence
//!
//! Files are named `<label>[_<period>days]_<YYYYMMDD_HHMMSS>.csv`. Two writes
//! for the same label and period within the same wall-clock second share a
//! name; the later one replaces the earlier.

use crate::{CsvDocument, Result};
use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;
use tracing::{debug, info};

/// Label used when no keyword was given
pub const FALLBACK_LABEL: &str = "all";

/// Timestamp suffix format
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Longest label kept in a file name, leaving room for the period and stamp
/// suffix under the usual 255-byte component limit
pub const MAX_LABEL_BYTES: usize = 200;

static ILLEGAL_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/:*?"<>|\s\x00-\x1F\x7F]+"#).expect("filename sanitizer pattern is valid")
});

/// Replace every run of filename-hostile characters with `_`, then cap the
/// result at [`MAX_LABEL_BYTES`] on a char boundary
pub fn sanitize_label(keyword: Option<&str>) -> String {
    match keyword.filter(|k| !k.is_empty()) {
        Some(keyword) => {
            let mut label = ILLEGAL_RUN.replace_all(keyword, "_").into_owned();
            truncate_at_char_boundary(&mut label, MAX_LABEL_BYTES);
            label
        }
        None => FALLBACK_LABEL.to_string(),
    }
}

fn truncate_at_char_boundary(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Destination of one CSV export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    label: String,
    period_days: Option<u32>,
    stamp: String,
}

impl OutputFile {
    /// Name the file using the current local time
    pub fn new(keyword: Option<&str>, period_days: Option<u32>) -> Self {
        Self::at(keyword, period_days, &Local::now())
    }

    pub fn at<Tz>(keyword: Option<&str>, period_days: Option<u32>, time: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            label: sanitize_label(keyword),
            period_days,
            stamp: time.format(STAMP_FORMAT).to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn period_days(&self) -> Option<u32> {
        self.period_days
    }

    pub fn file_name(&self) -> String {
        match self.period_days {
            Some(days) => format!("{}_{}days_{}.csv", self.label, days, self.stamp),
            None => format!("{}_{}.csv", self.label, self.stamp),
        }
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Write the rendered document in one call, creating `dir` if needed
    pub async fn write(&self, dir: &Path, document: &CsvDocument) -> Result<PathBuf> {
        if !dir.as_os_str().is_empty() && !fs::try_exists(dir).await? {
            fs::create_dir_all(dir).await?;
            info!("📁 Created directory: {}", dir.display());
        }

        let path = self.path_in(dir);
        let content = document.render();
        debug!("Writing {} bytes to {}", content.len(), path.display());

        fs::write(&path, content).await?;
        Ok(path)
    }
}
