//! Execution results and run summaries.

use im::HashMap;
use serde::Serialize;
use std::fmt;

use crate::diagnostics::Fault;
use crate::value::Value;

/// Final state of an example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotRun,
    Passed,
    Failed,
    Pending,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotRun => "not_run",
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Pending => "pending",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The sealed outcome of one example run.
///
/// Only the runner builds finished results; consumers get read-only accessors.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExecutionResult {
    status: Status,
    pending: bool,
    pending_message: Option<String>,
    exception_encountered: Option<Fault>,
}

impl ExecutionResult {
    /// Pending wins only when no fault was captured.
    pub(crate) fn finalized(
        pending: bool,
        pending_message: Option<String>,
        exception: Option<Fault>,
    ) -> Self {
        let status = match (&exception, pending) {
            (Some(_), _) => Status::Failed,
            (None, true) => Status::Pending,
            (None, false) => Status::Passed,
        };
        Self {
            status,
            pending,
            pending_message,
            exception_encountered: exception,
        }
    }

    pub(crate) fn failed_with(fault: Fault) -> Self {
        Self::finalized(false, None, Some(fault))
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    pub fn is_passed(&self) -> bool {
        self.status == Status::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// The raw pending flag, set even when a later fault turned the example Failed.
    pub fn pending_flag(&self) -> bool {
        self.pending
    }

    pub fn pending_message(&self) -> Option<&str> {
        self.pending_message.as_deref()
    }

    /// The first fault captured during the run.
    pub fn exception(&self) -> Option<&Fault> {
        self.exception_encountered.as_ref()
    }

    /// Metadata form stored under `execution_result`.
    pub fn to_value(&self) -> Value {
        let mut map = HashMap::new();
        map.insert("status".to_string(), Value::from(self.status.as_str()));
        map.insert("pending".to_string(), Value::Bool(self.pending));
        map.insert(
            "pending_message".to_string(),
            Value::from(self.pending_message.clone()),
        );
        let exception = match &self.exception_encountered {
            Some(fault) => {
                let mut f = HashMap::new();
                f.insert("kind".to_string(), Value::from(fault.kind().as_str()));
                f.insert("message".to_string(), Value::from(fault.message()));
                Value::Map(f)
            }
            None => Value::Nil,
        };
        map.insert("exception_encountered".to_string(), exception);
        Value::Map(map)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Counts of example outcomes across a group run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Pending => self.pending += 1,
            Status::NotRun => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.pending += other.pending;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.pending + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
