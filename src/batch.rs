use crate::pipeline::{Pipeline, RunReport};
use crate::{HarvestError, PlatformError};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use shorts_core::SearchCriteria;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// One (keyword, lookback period) unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub keyword: String,
    pub period_days: u32,
}

/// Keyword × period grid, walked keyword-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPlan {
    keywords: Vec<String>,
    periods_days: Vec<u32>,
}

impl BatchPlan {
    pub fn new(keywords: Vec<String>, periods_days: Vec<u32>) -> Self {
        Self {
            keywords,
            periods_days,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn periods_days(&self) -> &[u32] {
        &self.periods_days
    }

    pub fn len(&self) -> usize {
        self.keywords.len() * self.periods_days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn combinations(&self) -> impl Iterator<Item = Combination> + '_ {
        self.keywords.iter().flat_map(move |keyword| {
            self.periods_days.iter().map(move |&period_days| Combination {
                keyword: keyword.clone(),
                period_days,
            })
        })
    }
}

/// Why a combination failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombinationFailure {
    /// The platform returned a machine-readable error payload
    StructuredApi {
        status: u16,
        payload: serde_json::Value,
    },
    /// Any other error carrying a message
    Generic { message: String },
    /// Something that is not an error value, i.e. a panic
    Unknown { detail: String },
}

impl CombinationFailure {
    pub fn classify(err: &HarvestError) -> Self {
        match err {
            HarvestError::Platform(PlatformError::Api {
                status, payload, ..
            }) => CombinationFailure::StructuredApi {
                status: *status,
                payload: payload.clone(),
            },
            other => CombinationFailure::Generic {
                message: other.to_string(),
            },
        }
    }

    fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let detail = if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        CombinationFailure::Unknown { detail }
    }

    fn log(&self) {
        match self {
            CombinationFailure::StructuredApi { status, payload } => {
                let pretty = serde_json::to_string_pretty(payload)
                    .unwrap_or_else(|_| payload.to_string());
                error!("API Error ({}): {}", status, pretty);
            }
            CombinationFailure::Generic { message } => {
                error!("Error message: {}", message);
            }
            CombinationFailure::Unknown { detail } => {
                error!("Unknown error: {}", detail);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationOutcome {
    pub combination: Combination,
    pub result: Result<RunReport, CombinationFailure>,
}

impl CombinationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-combination outcomes of one batch run, in execution order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub outcomes: Vec<CombinationOutcome>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Combination, &CombinationFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|f| (&o.combination, f)))
    }
}

/// Walks a [`BatchPlan`] one combination at a time
///
/// Combinations never overlap, to stay inside the platform's rate limits.
/// A failing combination is logged and recorded; the batch always continues.
pub struct BatchDriver<'a> {
    pipeline: Pipeline<'a>,
    max_results: u32,
}

impl<'a> BatchDriver<'a> {
    pub fn new(pipeline: Pipeline<'a>, max_results: u32) -> Self {
        Self {
            pipeline,
            max_results,
        }
    }

    pub async fn run(&self, plan: &BatchPlan) -> BatchSummary {
        info!(
            "🚀 Starting batch processing for {} keywords and {} periods.",
            plan.keywords().len(),
            plan.periods_days().len()
        );

        let mut summary = BatchSummary::default();

        for combination in plan.combinations() {
            info!(
                "Processing: Keyword=\"{}\", Period={} days",
                combination.keyword, combination.period_days
            );

            let result = self.run_combination(&combination).await;

            if let Err(failure) = &result {
                error!(
                    "❌ Error processing keyword \"{}\" for period {} days:",
                    combination.keyword, combination.period_days
                );
                failure.log();
                warn!("Continuing to next task...");
            }

            summary.outcomes.push(CombinationOutcome {
                combination,
                result,
            });
        }

        info!(
            "🎉 Batch processing finished. ✅ {} succeeded, ❌ {} failed",
            summary.succeeded(),
            summary.failed()
        );

        summary
    }

    async fn run_combination(&self, combination: &Combination) -> Result<RunReport, CombinationFailure> {
        let criteria = SearchCriteria::builder()
            .keyword(Some(&combination.keyword))
            .lookback_days(Some(i64::from(combination.period_days)))
            .max_results(Some(self.max_results))
            .build();

        match AssertUnwindSafe(self.pipeline.run(&criteria)).catch_unwind().await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(CombinationFailure::classify(&e)),
            Err(panic) => Err(CombinationFailure::from_panic(panic)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shorts_core::CoreError;

    #[test]
    fn test_combinations_are_keyword_major() {
        let plan = BatchPlan::new(vec!["a".to_string(), "b".to_string()], vec![365, 90]);
        let combos: Vec<_> = plan
            .combinations()
            .map(|c| (c.keyword, c.period_days))
            .collect();

        assert_eq!(plan.len(), 4);
        assert_eq!(
            combos,
            vec![
                ("a".to_string(), 365),
                ("a".to_string(), 90),
                ("b".to_string(), 365),
                ("b".to_string(), 90),
            ]
        );
    }

    #[test]
    fn test_empty_plan() {
        let plan = BatchPlan::new(vec!["a".to_string()], Vec::new());
        assert!(plan.is_empty());
        assert_eq!(plan.combinations().count(), 0);
    }

    #[test]
    fn test_classify_structured_api_error() {
        let err = HarvestError::Platform(PlatformError::Api {
            status: 403,
            message: "quotaExceeded".to_string(),
            payload: serde_json::json!({"code": 403, "message": "quotaExceeded"}),
        });

        match CombinationFailure::classify(&err) {
            CombinationFailure::StructuredApi { status, payload } => {
                assert_eq!(status, 403);
                assert_eq!(payload["message"], "quotaExceeded");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_classify_generic_errors() {
        let unstructured = HarvestError::Platform(PlatformError::Status {
            status: 500,
            body: "oops".to_string(),
        });
        let io = HarvestError::Core(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )));

        for err in [unstructured, io] {
            assert!(matches!(
                CombinationFailure::classify(&err),
                CombinationFailure::Generic { .. }
            ));
        }
    }

    #[test]
    fn test_panic_payloads() {
        let from_str = CombinationFailure::from_panic(Box::new("boom"));
        let from_string = CombinationFailure::from_panic(Box::new(String::from("bang")));
        let other = CombinationFailure::from_panic(Box::new(7_u8));

        assert!(matches!(from_str, CombinationFailure::Unknown { ref detail } if detail == "boom"));
        assert!(matches!(from_string, CombinationFailure::Unknown { ref detail } if detail == "bang"));
        assert!(matches!(other, CombinationFailure::Unknown { .. }));
    }
}
