pub use crate::diagnostics::{ExemplarError, Fault, FaultKind, ResultExt};

pub mod config;
pub mod diagnostics;
pub mod example;
pub mod group;
pub mod hooks;
pub mod metadata;
pub mod result;
pub mod runtime;
pub mod value;

/// Everything a test file usually needs.
pub mod prelude {
    pub use crate::config::{MetadataFilter, RunConfig};
    pub use crate::diagnostics::{ExemplarError, Fault, FaultKind, ResultExt};
    pub use crate::example::Example;
    pub use crate::group::Group;
    pub use crate::hooks::{Hook, HookRegistry, Phase, Scope};
    pub use crate::metadata::{Metadata, EXECUTION_RESULT_KEY};
    pub use crate::result::{ExecutionResult, RunSummary, Status};
    pub use crate::runtime::{ExampleContext, ExampleRunner, GroupContext, Procedure};
    pub use crate::value::Value;
    pub use crate::{ensure, ensure_eq, fault};
}
