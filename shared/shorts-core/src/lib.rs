//! Shorts Core - Search criteria, duration filtering and CSV export for short-form videos

pub mod criteria;
pub mod record;
pub mod duration;
pub mod csv_export;
pub mod output_file;

pub use criteria::{DurationClass, SearchCriteria, SearchCriteriaBuilder, SearchOrder};
pub use record::{VideoId, VideoRecord};
pub use duration::{DurationPolicy, IsoDuration, ShortsFilter};
pub use csv_export::{CsvDocument, CsvSerializer};
pub use output_file::OutputFile;

/// Result type for Shorts Core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for Shorts Core operations
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid duration encoding: {0:?}")]
    InvalidDuration(String),

    #[error("Row has {found} fields, header has {expected}")]
    RowArity { expected: usize, found: usize },
}
