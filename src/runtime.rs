//! # Example Runtime
//!
//! Everything that happens while a single example runs.
//!
//! ## Module Structure
//!
//! - **`context`**: `ExampleContext` for each-scoped code, `GroupContext` for all-scoped hooks
//! - **`procedure`**: the around-hook handle and the core unit it eventually runs
//! - **`runner`**: `ExampleRunner`, which resolves hooks and seals the result
//!
//! ## Run Order
//!
//! ```text
//! around (outermost) -> ... -> around (innermost)
//!     -> before(each)* -> body -> after(each)*
//! ```
//!
//! The first fault anywhere in that chain becomes the example's exception.
//! After hooks always run.

pub mod context;
pub mod procedure;
pub mod runner;

pub use context::{ExampleContext, GroupContext, NO_EXECUTION_CONTEXT};
pub use procedure::Procedure;
pub use runner::ExampleRunner;
