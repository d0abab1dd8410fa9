//!
//! Fault taxonomy and crate errors for the exemplar engine.
//!
//! # Overview
//!
//! Everything that goes wrong while an example runs is a [`Fault`]. Faults are
//! values: hooks and bodies return them, the runner records the first one on the
//! example's result, and nothing unwinds past the example boundary.
//!
//! - `Fault::Assertion` - an expectation mismatch (what `ensure!`/`ensure_eq!` produce)
//! - `Fault::Runtime` - any other failure raised by a hook or a body
//! - `Fault::Usage` - the test definition itself is invalid, e.g. marking an
//!   example pending from a hook that runs once per group
//! - `Fault::Pending` - not a failure: the signal returned by `mark_pending`,
//!   which stops the hook or body that declared it
//!
//! Only usage faults ever leave a group run, wrapped in [`ExemplarError::Usage`].
//!
//! # Construction
//!
//! - `fault!(Runtime, "FOO")`
//! - `fault!(Assertion, "expected {} items", n)`
//! - `ensure_eq!(actual, expected)` inside a body or hook
//!

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Message used when an example is marked pending without a reason.
pub const NO_REASON_GIVEN: &str = "No reason given";

pub type SharedSource = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Type-safe fault classification, mirroring the [`Fault`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Expectation mismatch reported by the assertion collaborator
    Assertion,
    /// Any other fault raised by a body or hook
    Runtime,
    /// Invalid API use; surfaced instead of recorded
    Usage,
    /// Pending declaration; never recorded as the example's exception
    Pending,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Assertion => "assertion",
            FaultKind::Runtime => "runtime",
            FaultKind::Usage => "usage",
            FaultKind::Pending => "pending",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failure raised by an example body or one of its hooks.
#[derive(Debug, Clone, Error)]
pub enum Fault {
    #[error("Assertion failed: {message}")]
    Assertion {
        message: String,
        expected: Option<String>,
        actual: Option<String>,
    },
    #[error("{message}")]
    Runtime {
        message: String,
        #[source]
        source: Option<SharedSource>,
    },
    #[error("Usage error: {message}")]
    Usage {
        message: String,
        help: Option<String>,
    },
    #[error("Pending: {}", .message.as_deref().unwrap_or(NO_REASON_GIVEN))]
    Pending { message: Option<String> },
}

impl Fault {
    pub fn assertion(message: impl Into<String>) -> Self {
        Fault::Assertion {
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// An assertion fault carrying the rendered expected and actual values.
    pub fn mismatch(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Fault::Assertion {
            message: message.into(),
            expected: Some(expected.into()),
            actual: Some(actual.into()),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Fault::Runtime {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error as a runtime fault, keeping it as the source.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Fault::Runtime {
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Fault::Usage {
            message: message.into(),
            help: None,
        }
    }

    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Fault::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn pending(message: Option<String>) -> Self {
        Fault::Pending { message }
    }

    /// The bare message, without the kind prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            Fault::Assertion { message, .. }
            | Fault::Runtime { message, .. }
            | Fault::Usage { message, .. } => message,
            Fault::Pending { message } => message.as_deref().unwrap_or(NO_REASON_GIVEN),
        }
    }

    pub fn kind(&self) -> FaultKind {
        match self {
            Fault::Assertion { .. } => FaultKind::Assertion,
            Fault::Runtime { .. } => FaultKind::Runtime,
            Fault::Usage { .. } => FaultKind::Usage,
            Fault::Pending { .. } => FaultKind::Pending,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Fault::Usage { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Fault::Pending { .. })
    }
}

// Sources are opaque, so equality is by kind and rendered fields.
impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Fault::Assertion {
                    message: m1,
                    expected: e1,
                    actual: a1,
                },
                Fault::Assertion {
                    message: m2,
                    expected: e2,
                    actual: a2,
                },
            ) => m1 == m2 && e1 == e2 && a1 == a2,
            (Fault::Runtime { message: m1, .. }, Fault::Runtime { message: m2, .. }) => m1 == m2,
            (Fault::Usage { message: m1, .. }, Fault::Usage { message: m2, .. }) => m1 == m2,
            (Fault::Pending { message: m1 }, Fault::Pending { message: m2 }) => m1 == m2,
            _ => false,
        }
    }
}

impl Diagnostic for Fault {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("exemplar::{}", self.kind())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Fault::Usage {
                help: Some(help), ..
            } => Some(Box::new(help)),
            Fault::Assertion {
                expected: Some(expected),
                actual: Some(actual),
                ..
            } => Some(Box::new(format!("expected: {}\n  actual: {}", expected, actual))),
            _ => None,
        }
    }
}

impl Serialize for Fault {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Fault", 4)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", self.message())?;
        let (expected, actual) = match self {
            Fault::Assertion {
                expected, actual, ..
            } => (expected.as_deref(), actual.as_deref()),
            _ => (None, None),
        };
        state.serialize_field("expected", &expected)?;
        state.serialize_field("actual", &actual)?;
        state.end()
    }
}

/// Converts foreign errors into runtime faults so bodies can use `?`.
pub trait ResultExt<T> {
    fn or_fault(self) -> Result<T, Fault>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn or_fault(self) -> Result<T, Fault> {
        self.map_err(Fault::from_error)
    }
}

/// Errors that escape a group run.
#[derive(Debug, Error)]
pub enum ExemplarError {
    /// A structurally invalid test definition.
    #[error(transparent)]
    Usage(Fault),
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl ExemplarError {
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ExemplarError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The wrapped usage fault, if this is one.
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            ExemplarError::Usage(fault) => Some(fault),
            ExemplarError::Config { .. } => None,
        }
    }
}

impl Diagnostic for ExemplarError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            ExemplarError::Usage(fault) => fault.code(),
            ExemplarError::Config { .. } => Some(Box::new("exemplar::config")),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            ExemplarError::Usage(fault) => fault.help(),
            ExemplarError::Config { .. } => None,
        }
    }
}

impl From<Fault> for ExemplarError {
    fn from(fault: Fault) -> Self {
        ExemplarError::Usage(fault)
    }
}

/// Constructs a [`Fault`] of the given variant from a format string.
///
/// ```rust
/// use exemplar::fault;
/// let f = fault!(Runtime, "this error");
/// assert_eq!(f.message(), "this error");
/// let g = fault!(Assertion, "expected {} items", 3);
/// assert_eq!(g.message(), "expected 3 items");
/// ```
#[macro_export]
macro_rules! fault {
    (Assertion, $($arg:tt)+) => {
        $crate::Fault::assertion(format!($($arg)+))
    };
    (Runtime, $($arg:tt)+) => {
        $crate::Fault::runtime(format!($($arg)+))
    };
    (Usage, $($arg:tt)+) => {
        $crate::Fault::usage(format!($($arg)+))
    };
}

/// Returns an assertion fault from the enclosing hook or body unless `cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr) => {
        if !$cond {
            return Err($crate::Fault::assertion(concat!(
                "condition failed: ",
                stringify!($cond)
            )));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::Fault::assertion(format!($($arg)+)));
        }
    };
}

/// Returns an assertion fault unless `actual == expected`.
#[macro_export]
macro_rules! ensure_eq {
    ($actual:expr, $expected:expr $(,)?) => {
        match (&$actual, &$expected) {
            (actual, expected) => {
                if !(*actual == *expected) {
                    return Err($crate::Fault::mismatch(
                        concat!(stringify!($actual), " == ", stringify!($expected)),
                        format!("{:?}", expected),
                        format!("{:?}", actual),
                    ));
                }
            }
        }
    };
}
