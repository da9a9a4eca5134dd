//! Stage bookkeeping: timing, status and panic containment.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;

use crate::error::Result;
use crate::util::now_millis;

/// The six conversion stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Parse,
    Split,
    Generate,
    Css,
    Assets,
    Package,
}

impl StageName {
    pub const ALL: [StageName; 6] = [
        StageName::Parse,
        StageName::Split,
        StageName::Generate,
        StageName::Css,
        StageName::Assets,
        StageName::Package,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Parse => "parse",
            StageName::Split => "split",
            StageName::Generate => "generate",
            StageName::Css => "css",
            StageName::Assets => "assets",
            StageName::Package => "package",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Complete,
    Error,
}

/// `{name, status, duration, message}` for one stage that ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub name: StageName,
    pub status: StageStatus,
    /// Milliseconds.
    pub duration: f64,
    pub message: String,
}

/// Why a run stopped before finishing every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Failed { stage: StageName, message: String },
    Cancelled { before: StageName },
}

/// Ordered log of the stages that ran.
#[derive(Debug, Default)]
pub struct StageLog {
    reports: Vec<StageReport>,
}

impl StageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one stage, recording its duration and outcome.
    ///
    /// An error or a panic inside `f` is recorded as this stage's error and
    /// returned as [`Halt::Failed`]; `describe` produces the success message.
    pub fn run<T>(
        &mut self,
        name: StageName,
        f: impl FnOnce() -> Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> std::result::Result<T, Halt> {
        tracing::debug!(stage = %name, "stage started");
        let start = now_millis();
        let outcome = catch_unwind(AssertUnwindSafe(f));
        let duration = (now_millis() - start).max(0.0);

        let failure = match outcome {
            Ok(Ok(value)) => {
                let message = describe(&value);
                tracing::info!(stage = %name, duration_ms = duration, "{message}");
                self.reports.push(StageReport {
                    name,
                    status: StageStatus::Complete,
                    duration,
                    message,
                });
                return Ok(value);
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("internal error: {}", panic_message(payload.as_ref())),
        };

        tracing::warn!(stage = %name, duration_ms = duration, error = %failure, "stage failed");
        self.reports.push(StageReport {
            name,
            status: StageStatus::Error,
            duration,
            message: failure.clone(),
        });
        Err(Halt::Failed {
            stage: name,
            message: failure,
        })
    }

    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<StageReport> {
        self.reports
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_records_success_and_failure() {
        let mut log = StageLog::new();
        let value = log.run(StageName::Parse, || Ok(3), |n| format!("{n} nodes"));
        assert_eq!(value, Ok(3));
        let failed = log.run(
            StageName::Split,
            || Err::<(), _>(Error::Split("no root".into())),
            |_| String::new(),
        );
        assert_eq!(
            failed,
            Err(Halt::Failed {
                stage: StageName::Split,
                message: "component split failed: no root".into()
            })
        );
        let reports = log.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, StageStatus::Complete);
        assert_eq!(reports[0].message, "3 nodes");
        assert_eq!(reports[1].status, StageStatus::Error);
        assert!(reports.iter().all(|r| r.duration >= 0.0));
    }

    #[test]
    fn test_panics_become_stage_errors() {
        let mut log = StageLog::new();
        let result: std::result::Result<(), Halt> =
            log.run(StageName::Css, || panic!("selector overflow"), |_| String::new());
        match result {
            Err(Halt::Failed { stage, message }) => {
                assert_eq!(stage, StageName::Css);
                assert!(message.contains("selector overflow"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
