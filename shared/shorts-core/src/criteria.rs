//! Search criteria construction
//!
//! Every input is defaulted rather than rejected: a missing or non-positive
//! lookback becomes [`DEFAULT_LOOKBACK_DAYS`], a missing or zero page size
//! becomes [`MAX_PAGE_SIZE`], and larger page sizes are clamped to it.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Lookback window used when none (or a non-positive one) is given
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Largest page the search endpoint will return
pub const MAX_PAGE_SIZE: u32 = 50;

/// Result ordering requested from the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOrder {
    ViewCount,
}

impl SearchOrder {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

/// Platform-side duration class filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationClass {
    Short,
}

impl DurationClass {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            DurationClass::Short => "short",
        }
    }
}

/// Immutable search request description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    keyword: Option<String>,
    lookback_days: u32,
    published_after: DateTime<Utc>,
    max_results: u32,
    order: SearchOrder,
    duration_class: DurationClass,
}

impl SearchCriteria {
    pub fn builder() -> SearchCriteriaBuilder {
        SearchCriteriaBuilder::default()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub fn published_after(&self) -> DateTime<Utc> {
        self.published_after
    }

    /// Cutoff in the platform's timestamp form, e.g. `2024-01-01T00:00:00.000Z`
    pub fn published_after_param(&self) -> String {
        self.published_after.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn order(&self) -> SearchOrder {
        self.order
    }

    pub fn duration_class(&self) -> DurationClass {
        self.duration_class
    }
}

/// Builder for [`SearchCriteria`]
#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaBuilder {
    keyword: Option<String>,
    lookback_days: Option<i64>,
    max_results: Option<u32>,
}

impl SearchCriteriaBuilder {
    /// Blank keywords are treated as absent
    pub fn keyword(mut self, keyword: Option<&str>) -> Self {
        self.keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        self
    }

    pub fn lookback_days(mut self, days: Option<i64>) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn build(self) -> SearchCriteria {
        self.build_at(Utc::now())
    }

    /// Build with an explicit "now", used to compute the publish cutoff
    pub fn build_at(self, now: DateTime<Utc>) -> SearchCriteria {
        let lookback_days = match self.lookback_days {
            Some(days) if days > 0 => u32::try_from(days).unwrap_or(u32::MAX),
            _ => DEFAULT_LOOKBACK_DAYS,
        };

        let max_results = match self.max_results {
            None | Some(0) => MAX_PAGE_SIZE,
            Some(n) => n.min(MAX_PAGE_SIZE),
        };

        // Lookbacks beyond chrono's range saturate at the earliest representable instant
        let published_after = now
            .checked_sub_signed(Duration::days(i64::from(lookback_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        SearchCriteria {
            keyword: self.keyword,
            lookback_days,
            published_after,
            max_results,
            order: SearchOrder::ViewCount,
            duration_class: DurationClass::Short,
        }
    }
}
