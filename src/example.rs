//! A single example: description, merged metadata, body and result slot.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::diagnostics::Fault;
use crate::metadata::{
    join_description, Metadata, DESCRIPTION_KEY, EXECUTION_RESULT_KEY, FULL_DESCRIPTION_KEY,
};
use crate::result::ExecutionResult;
use crate::runtime::context::ExampleContext;

/// Example body: the test code itself.
pub type ExampleBodyFn = dyn Fn(&mut ExampleContext<'_>) -> Result<(), Fault>;

/// Pending message given to examples registered without a body.
pub const NOT_YET_IMPLEMENTED: &str = "Not Yet Implemented";

pub struct Example {
    description: String,
    full_description: String,
    metadata: RefCell<Metadata>,
    body: Option<Rc<ExampleBodyFn>>,
    result: RefCell<ExecutionResult>,
    in_block: Cell<bool>,
}

impl Example {
    /// Builds an example whose metadata is `inherited` merged with `own`.
    pub(crate) fn new(
        description: impl Into<String>,
        inherited: &Metadata,
        own: Metadata,
        body: Option<Rc<ExampleBodyFn>>,
    ) -> Self {
        let description = description.into();
        let parent_full = inherited.get(FULL_DESCRIPTION_KEY).and_then(|v| v.as_str());
        let full_description = join_description(parent_full, &description);
        let mut metadata = Metadata::merge(inherited, &own);
        metadata.insert(DESCRIPTION_KEY, description.as_str());
        metadata.insert(FULL_DESCRIPTION_KEY, full_description.as_str());
        Self {
            description,
            full_description,
            metadata: RefCell::new(metadata),
            body,
            result: RefCell::new(ExecutionResult::default()),
            in_block: Cell::new(false),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn full_description(&self) -> &str {
        &self.full_description
    }

    /// Snapshot of the merged metadata, including `execution_result` once run.
    pub fn metadata(&self) -> Metadata {
        self.metadata.borrow().clone()
    }

    pub fn execution_result(&self) -> ExecutionResult {
        self.result.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.result.borrow().is_pending()
    }

    /// True only while the body itself is executing.
    pub fn in_block(&self) -> bool {
        self.in_block.get()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn body(&self) -> Option<&Rc<ExampleBodyFn>> {
        self.body.as_ref()
    }

    pub(crate) fn in_block_flag(&self) -> &Cell<bool> {
        &self.in_block
    }

    /// Seals `result` onto the example and mirrors it into metadata.
    pub(crate) fn finalize(&self, result: ExecutionResult) {
        self.in_block.set(false);
        self.metadata
            .borrow_mut()
            .insert(EXECUTION_RESULT_KEY, result.to_value());
        *self.result.borrow_mut() = result;
    }
}

impl fmt::Debug for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Example")
            .field("description", &self.description)
            .field("has_body", &self.body.is_some())
            .field("result", &self.result.borrow())
            .finish()
    }
}

/// Marks the example as inside its body until dropped.
pub(crate) struct InBlockGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> InBlockGuard<'a> {
    pub(crate) fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for InBlockGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
