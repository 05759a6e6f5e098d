//! ISO 8601 duration parsing and the short-form duration filter
//!
//! The platform encodes video lengths as `P[nW][nD][T[nH][nM][nS]]`, e.g.
//! `PT45S`, `PT1M30S` or `P0D` for live placeholders.

use crate::{CoreError, Result, VideoRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest clip, in seconds, that still counts as a short
pub const SHORT_MAX_SECONDS: u64 = 60;

/// Decomposed duration encoding
///
/// Components are `None` when absent from the encoding, so `PT0M45S` and
/// `PT45S` stay distinguishable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoDuration {
    pub weeks: Option<u64>,
    pub days: Option<u64>,
    pub hours: Option<u64>,
    pub minutes: Option<u64>,
    pub seconds: Option<u64>,
}

impl IsoDuration {
    pub fn parse(code: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidDuration(code.to_string());

        let rest = code.strip_prefix('P').ok_or_else(invalid)?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((date, time)) => {
                if time.is_empty() {
                    return Err(invalid());
                }
                (date, Some(time))
            }
            None => (rest, None),
        };

        let mut duration = IsoDuration::default();

        for (value, unit) in components(date_part).ok_or_else(invalid)? {
            let slot = match unit {
                'W' if duration.days.is_none() => &mut duration.weeks,
                'D' => &mut duration.days,
                _ => return Err(invalid()),
            };
            if slot.is_some() {
                return Err(invalid());
            }
            *slot = Some(value);
        }

        if let Some(time_part) = time_part {
            for (value, unit) in components(time_part).ok_or_else(invalid)? {
                let slot = match unit {
                    'H' if duration.minutes.is_none() && duration.seconds.is_none() => {
                        &mut duration.hours
                    }
                    'M' if duration.seconds.is_none() => &mut duration.minutes,
                    'S' => &mut duration.seconds,
                    _ => return Err(invalid()),
                };
                if slot.is_some() {
                    return Err(invalid());
                }
                *slot = Some(value);
            }
        }

        if duration == IsoDuration::default() {
            return Err(invalid());
        }

        Ok(duration)
    }

    pub fn total_seconds(&self) -> u64 {
        let part = |v: Option<u64>, factor: u64| v.unwrap_or(0).saturating_mul(factor);

        part(self.weeks, 7 * 86_400)
            .saturating_add(part(self.days, 86_400))
            .saturating_add(part(self.hours, 3_600))
            .saturating_add(part(self.minutes, 60))
            .saturating_add(part(self.seconds, 1))
    }

    /// True when the encoding names any unit larger than seconds, even with a zero value
    pub fn has_higher_order_component(&self) -> bool {
        self.weeks.is_some() || self.days.is_some() || self.hours.is_some() || self.minutes.is_some()
    }
}

impl FromStr for IsoDuration {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Splits `12H3M` into `[(12, 'H'), (3, 'M')]`; `None` on any malformed piece
fn components(part: &str) -> Option<Vec<(u64, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();

    for c in part.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c.is_ascii_uppercase() && !digits.is_empty() {
            out.push((digits.parse().ok()?, c));
            digits.clear();
        } else {
            return None;
        }
    }

    if digits.is_empty() {
        Some(out)
    } else {
        None
    }
}

/// Rule deciding which duration encodings count as shorts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Only seconds-only encodings of at most 60s pass.
    ///
    /// `PT1M` and `PT0M45S` are rejected although both last at most 60s.
    #[default]
    SecondsOnly,
    /// Any encoding whose total length is at most 60s passes.
    TotalSeconds,
}

/// Keeps records whose duration qualifies as a short under a [`DurationPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortsFilter {
    policy: DurationPolicy,
}

impl ShortsFilter {
    pub fn new(policy: DurationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    pub fn accepts(&self, duration_code: &str) -> bool {
        let Ok(duration) = IsoDuration::parse(duration_code) else {
            return false;
        };

        match self.policy {
            DurationPolicy::SecondsOnly => {
                if duration.has_higher_order_component() {
                    return false;
                }
                duration.seconds.is_some_and(|s| s <= SHORT_MAX_SECONDS)
            }
            DurationPolicy::TotalSeconds => duration.total_seconds() <= SHORT_MAX_SECONDS,
        }
    }

    pub fn apply(&self, records: Vec<VideoRecord>) -> Vec<VideoRecord> {
        records
            .into_iter()
            .filter(|record| self.accepts(&record.duration_code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let d = IsoDuration::parse("P1DT2H3M4S").unwrap();
        assert_eq!(d.days, Some(1));
        assert_eq!(d.hours, Some(2));
        assert_eq!(d.minutes, Some(3));
        assert_eq!(d.seconds, Some(4));
        assert_eq!(d.total_seconds(), 86_400 + 7_200 + 180 + 4);

        let d: IsoDuration = "PT45S".parse().unwrap();
        assert_eq!(d.seconds, Some(45));
        assert!(!d.has_higher_order_component());
    }

    #[test]
    fn test_zero_minute_component_is_still_present() {
        let d = IsoDuration::parse("PT0M45S").unwrap();
        assert_eq!(d.minutes, Some(0));
        assert!(d.has_higher_order_component());
        assert_eq!(d.total_seconds(), 45);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for code in ["", "P", "PT", "45S", "PT45", "PT1.5S", "PTS", "PT45S1M", "PT1H1H", "pt45s", "P1DT"] {
            assert!(IsoDuration::parse(code).is_err(), "{code:?} should not parse");
        }
    }

    #[test]
    fn test_live_placeholder_parses_with_day_component() {
        let d = IsoDuration::parse("P0D").unwrap();
        assert_eq!(d.days, Some(0));
        assert_eq!(d.total_seconds(), 0);
    }

    #[test]
    fn test_seconds_only_policy() {
        let filter = ShortsFilter::default();
        assert_eq!(filter.policy(), DurationPolicy::SecondsOnly);

        assert!(filter.accepts("PT0S"));
        assert!(filter.accepts("PT9S"));
        assert!(filter.accepts("PT59S"));
        assert!(filter.accepts("PT60S"));

        assert!(!filter.accepts("PT61S"));
        assert!(!filter.accepts("PT1M"));
        assert!(!filter.accepts("PT1M0S"));
        assert!(!filter.accepts("PT0M45S"));
        assert!(!filter.accepts("PT1H"));
        assert!(!filter.accepts("P0D"));
        assert!(!filter.accepts("garbage"));
    }

    #[test]
    fn test_total_seconds_policy() {
        let filter = ShortsFilter::new(DurationPolicy::TotalSeconds);

        assert!(filter.accepts("PT45S"));
        assert!(filter.accepts("PT1M"));
        assert!(filter.accepts("PT0M45S"));
        assert!(filter.accepts("P0D"));
        assert!(!filter.accepts("PT1M1S"));
        assert!(!filter.accepts("PT2M"));
    }

    #[test]
    fn test_apply_keeps_order() {
        let records = vec![
            VideoRecord::new("a").with_duration("PT30S"),
            VideoRecord::new("b").with_duration("PT1M"),
            VideoRecord::new("c").with_duration("PT12S"),
        ];

        let kept = ShortsFilter::default().apply(records);
        let ids: Vec<_> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
