use tracing::debug;

use crate::diagnostics::Fault;
use crate::example::{Example, NOT_YET_IMPLEMENTED};
use crate::group::Group;
use crate::metadata::{Metadata, EXECUTION_RESULT_KEY};
use crate::result::ExecutionResult;
use crate::value::Value;

/// Message of the usage fault raised when pending is requested without an example.
pub const NO_EXECUTION_CONTEXT: &str = "no execution context available";

/// Per-run state handed to the body and to every each-scoped hook.
///
/// Owned by a single run and consumed by [`ExampleContext::finish`].
pub struct ExampleContext<'a> {
    example: &'a Example,
    metadata: Metadata,
    group_metadata: Metadata,
    pending: bool,
    pending_message: Option<String>,
    exception: Option<Fault>,
    body_finished: bool,
}

impl<'a> ExampleContext<'a> {
    pub(crate) fn new(example: &'a Example, group_metadata: Metadata) -> Self {
        // A previous run's result is not visible to the next one.
        let mut metadata = example.metadata();
        metadata.remove(EXECUTION_RESULT_KEY);
        Self {
            example,
            metadata,
            group_metadata,
            pending: false,
            pending_message: None,
            exception: None,
            body_finished: false,
        }
    }

    pub fn description(&self) -> &str {
        self.example.description()
    }

    pub fn full_description(&self) -> &str {
        self.example.full_description()
    }

    /// Group metadata merged with the example's own.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Metadata of the group that owns the example.
    pub fn group_metadata(&self) -> &Metadata {
        &self.group_metadata
    }

    /// Alias of [`metadata`](Self::metadata) for ad-hoc option lookup.
    pub fn options(&self) -> &Metadata {
        &self.metadata
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn in_block(&self) -> bool {
        self.example.in_block()
    }

    /// Declares the example pending.
    ///
    /// Always returns `Err`: on success the error is the [`Fault::Pending`]
    /// signal, which `?` carries out of the hook or body so nothing after the
    /// declaration runs. Remaining before(each) hooks and the body are skipped
    /// either way; after(each) hooks still run. Once the body has finished
    /// the error is a usage fault instead.
    ///
    /// ```rust
    /// use exemplar::prelude::*;
    ///
    /// let mut group = Group::new("widgets");
    /// group.example("not ready", |ctx| {
    ///     ctx.mark_pending_with("waiting on the parser")?;
    ///     Err(fault!(Assertion, "never reached"))
    /// });
    /// group.run().unwrap();
    /// assert!(group.examples()[0].is_pending());
    /// ```
    pub fn mark_pending(&mut self) -> Result<(), Fault> {
        self.set_pending(None)
    }

    pub fn mark_pending_with(&mut self, message: impl Into<String>) -> Result<(), Fault> {
        self.set_pending(Some(message.into()))
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// First fault captured so far in this run.
    pub fn exception(&self) -> Option<&Fault> {
        self.exception.as_ref()
    }

    fn set_pending(&mut self, message: Option<String>) -> Result<(), Fault> {
        if self.body_finished {
            return Err(late_pending());
        }
        self.declare_pending(message);
        Err(Fault::pending(self.pending_message.clone()))
    }

    fn declare_pending(&mut self, message: Option<String>) {
        self.pending = true;
        if message.is_some() {
            self.pending_message = message;
        }
    }

    // ------------------------------------------------------------------------
    // Runner-facing state transitions
    // ------------------------------------------------------------------------

    /// Keeps `fault` unless one was already captured. Returns whether it was kept.
    ///
    /// A pending signal is not a fault: it marks the example pending, or is a
    /// usage fault when it first shows up after the body finished.
    pub(crate) fn record_fault(&mut self, fault: Fault) -> bool {
        let fault = match fault {
            Fault::Pending { message } if !self.body_finished => {
                self.declare_pending(message);
                return false;
            }
            Fault::Pending { .. } if self.pending => return false,
            Fault::Pending { .. } => late_pending(),
            other => other,
        };
        if self.exception.is_some() {
            debug!(
                example = %self.example.full_description(),
                fault = %fault,
                "dropping fault raised after the first"
            );
            return false;
        }
        self.exception = Some(fault);
        true
    }

    /// True once pending or a fault means no further setup or body should run.
    pub(crate) fn halted(&self) -> bool {
        self.pending || self.exception.is_some()
    }

    pub(crate) fn mark_not_implemented(&mut self) {
        self.pending = true;
        self.pending_message = Some(NOT_YET_IMPLEMENTED.to_string());
    }

    pub(crate) fn end_body(&mut self) {
        self.body_finished = true;
    }

    pub(crate) fn finish(self) -> ExecutionResult {
        ExecutionResult::finalized(self.pending, self.pending_message, self.exception)
    }
}

/// Context handed to all-scoped hooks, which run once per group.
///
/// There is no example here, so anything per-example is a usage fault.
pub struct GroupContext<'a> {
    group: &'a Group,
}

impl<'a> GroupContext<'a> {
    pub(crate) fn new(group: &'a Group) -> Self {
        Self { group }
    }

    pub fn description(&self) -> &str {
        self.group.description()
    }

    pub fn full_description(&self) -> &str {
        self.group.full_description()
    }

    pub fn metadata(&self) -> &Metadata {
        self.group.metadata()
    }

    pub fn mark_pending(&mut self) -> Result<(), Fault> {
        Err(no_execution_context())
    }
}

fn late_pending() -> Fault {
    Fault::usage_with_help(
        "pending declared after the example body finished",
        "mark the example pending from its body, a before(each) hook or an around hook",
    )
}

pub(crate) fn no_execution_context() -> Fault {
    Fault::usage_with_help(
        format!("{}: pending is only valid inside an example", NO_EXECUTION_CONTEXT),
        "move the pending call into the example, a before(each) hook or an around hook",
    )
}
