//! CSV projection of video records
//!
//! Text columns are always double-quoted with embedded quotes doubled and
//! line breaks collapsed to a single space. Count columns are emitted bare.
//! Rows are separated by a single `\n` with no trailing newline.

use crate::{CoreError, Result, VideoRecord};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use tracing::warn;

/// Column names, in output order
pub const HEADER: [&str; 9] = [
    "Title",
    "Link",
    "Views",
    "Likes",
    "Comments",
    "Channel Title",
    "Description",
    "Tags",
    "Published",
];

/// Display form of the publish timestamp
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Header-first sequence of escaped rows
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDocument {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvDocument {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row of already-escaped fields
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.header.len() {
            return Err(CoreError::RowArity {
                expected: self.header.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .map(|row| row.join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for CsvDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Maps [`VideoRecord`]s onto the fixed column schema
#[derive(Debug, Clone)]
pub struct CsvSerializer<Tz: TimeZone> {
    timezone: Tz,
}

impl CsvSerializer<Local> {
    /// Serializer that renders publish times in the machine's local zone
    pub fn local() -> Self {
        Self { timezone: Local }
    }
}

impl Default for CsvSerializer<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz> CsvSerializer<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn with_timezone(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn serialize(&self, records: &[VideoRecord]) -> Result<CsvDocument> {
        let mut document = CsvDocument::new(&HEADER);
        for record in records {
            document.push_row(self.row(record))?;
        }
        Ok(document)
    }

    fn row(&self, record: &VideoRecord) -> Vec<String> {
        vec![
            quote_text(&record.title),
            quote_text(&record.shorts_link()),
            count_field(record.view_count.as_deref()),
            count_field(record.like_count.as_deref()),
            count_field(record.comment_count.as_deref()),
            quote_text(&record.channel_title),
            quote_text(&record.description),
            quote_text(&record.tags.join(", ")),
            self.format_published(record.published_at.as_deref()),
        ]
    }

    /// `YYYY-MM-DD HH:mm` in the serializer's zone, empty when absent or unreadable
    pub fn format_published(&self, published_at: Option<&str>) -> String {
        let Some(raw) = published_at.filter(|s| !s.is_empty()) else {
            return String::new();
        };

        match DateTime::parse_from_rfc3339(raw) {
            Ok(timestamp) => timestamp
                .with_timezone(&self.timezone)
                .format(PUBLISHED_FORMAT)
                .to_string(),
            Err(e) => {
                warn!("Unreadable publish timestamp {:?}: {}", raw, e);
                String::new()
            }
        }
    }
}

/// Collapse line breaks and double embedded quotes, then wrap in quotes
pub fn quote_text(value: &str) -> String {
    let flattened = value.replace("\r\n", " ").replace(['\r', '\n'], " ");
    format!("\"{}\"", flattened.replace('"', "\"\""))
}

/// Bare decimal count; `0` when missing, quoted text when not plain digits
fn count_field(value: Option<&str>) -> String {
    match value {
        None => "0".to_string(),
        Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => v.to_string(),
        Some(v) => quote_text(v),
    }
}
