//! Example groups: hook lists, examples, nested groups and shared metadata.
//!
//! Groups are built up front and then run through a shared borrow, so hook
//! lists cannot change while any example in the tree is running.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::diagnostics::{ExemplarError, Fault};
use crate::example::Example;
use crate::hooks::{Hook, HookRegistry, Phase, Scope};
use crate::metadata::{join_description, Metadata, DESCRIPTION_KEY, FULL_DESCRIPTION_KEY};
use crate::result::{ExecutionResult, RunSummary, Status};
use crate::runtime::context::{no_execution_context, ExampleContext, GroupContext};
use crate::runtime::procedure::Procedure;
use crate::runtime::runner::ExampleRunner;

pub struct Group {
    description: String,
    full_description: String,
    metadata: Metadata,
    hooks: HookRegistry,
    examples: Vec<Example>,
    children: Vec<Group>,
}

/// Cross-group state for one top-level run.
#[derive(Default)]
struct RunState {
    halted: bool,
}

impl Group {
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_metadata(description, Metadata::new())
    }

    pub fn with_metadata(description: impl Into<String>, metadata: Metadata) -> Self {
        Self::build(description.into(), &Metadata::new(), metadata)
    }

    fn build(description: String, inherited: &Metadata, own: Metadata) -> Self {
        let parent_full = inherited.get(FULL_DESCRIPTION_KEY).and_then(|v| v.as_str());
        let full_description = join_description(parent_full, &description);
        let mut metadata = Metadata::merge(inherited, &own);
        metadata.insert(DESCRIPTION_KEY, description.as_str());
        metadata.insert(FULL_DESCRIPTION_KEY, full_description.as_str());
        Self {
            description,
            full_description,
            metadata,
            hooks: HookRegistry::new(),
            examples: Vec::new(),
            children: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn full_description(&self) -> &str {
        &self.full_description
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn groups(&self) -> &[Group] {
        &self.children
    }

    // ------------------------------------------------------------------------
    // Building
    // ------------------------------------------------------------------------

    /// Adds a nested group that inherits this group's metadata.
    pub fn describe<F>(&mut self, description: impl Into<String>, build: F) -> &mut Self
    where
        F: FnOnce(&mut Group),
    {
        self.describe_with(description, Metadata::new(), build)
    }

    pub fn describe_with<F>(
        &mut self,
        description: impl Into<String>,
        metadata: Metadata,
        build: F,
    ) -> &mut Self
    where
        F: FnOnce(&mut Group),
    {
        let mut child = Group::build(description.into(), &self.metadata, metadata);
        build(&mut child);
        self.children.push(child);
        self
    }

    pub fn example<F>(&mut self, description: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&mut ExampleContext<'_>) -> Result<(), Fault> + 'static,
    {
        self.example_with(description, Metadata::new(), body)
    }

    pub fn example_with<F>(
        &mut self,
        description: impl Into<String>,
        metadata: Metadata,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&mut ExampleContext<'_>) -> Result<(), Fault> + 'static,
    {
        let example = Example::new(description, &self.metadata, metadata, Some(Rc::new(body)));
        self.examples.push(example);
        self
    }

    /// Registers an example with no body; it finishes as pending.
    pub fn pending_example(&mut self, description: impl Into<String>) -> &mut Self {
        let example = Example::new(description, &self.metadata, Metadata::new(), None);
        self.examples.push(example);
        self
    }

    /// Registers `hook` in the (scope, phase) slot of this group's registry.
    pub fn register(&mut self, scope: Scope, phase: Phase, hook: Hook) -> Result<&mut Self, Fault> {
        self.hooks.register(scope, phase, hook)?;
        Ok(self)
    }

    pub fn before_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut ExampleContext<'_>) -> Result<(), Fault> + 'static,
    {
        self.push_hook(Scope::Each, Phase::Before, Hook::example(hook))
    }

    pub fn after_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut ExampleContext<'_>) -> Result<(), Fault> + 'static,
    {
        self.push_hook(Scope::Each, Phase::After, Hook::example(hook))
    }

    pub fn around_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut ExampleContext<'_>, &mut Procedure<'_>) -> Result<(), Fault> + 'static,
    {
        self.push_hook(Scope::Each, Phase::Around, Hook::around(hook))
    }

    pub fn before_all<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut GroupContext<'_>) -> Result<(), Fault> + 'static,
    {
        self.push_hook(Scope::All, Phase::Before, Hook::group(hook))
    }

    pub fn after_all<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut GroupContext<'_>) -> Result<(), Fault> + 'static,
    {
        self.push_hook(Scope::All, Phase::After, Hook::group(hook))
    }

    // Shapes are fixed by the typed helpers above, so registration cannot fail.
    fn push_hook(&mut self, scope: Scope, phase: Phase, hook: Hook) -> &mut Self {
        if let Err(fault) = self.hooks.register(scope, phase, hook) {
            debug_assert!(false, "typed hook rejected: {fault}");
        }
        self
    }

    // ------------------------------------------------------------------------
    // Running
    // ------------------------------------------------------------------------

    pub fn run(&self) -> Result<RunSummary, ExemplarError> {
        self.run_with(&RunConfig::default())
    }

    /// Runs every example in this group and its nested groups.
    ///
    /// Example failures are recorded on the examples; only usage faults from
    /// all-scoped hooks come back as errors.
    pub fn run_with(&self, config: &RunConfig) -> Result<RunSummary, ExemplarError> {
        let mut chain = Vec::new();
        let mut state = RunState::default();
        self.run_in(&mut chain, config, &mut state)
    }

    fn run_in<'g>(
        &'g self,
        chain: &mut Vec<&'g Group>,
        config: &RunConfig,
        state: &mut RunState,
    ) -> Result<RunSummary, ExemplarError> {
        chain.push(self);
        let outcome = self.run_level(chain, config, state);
        chain.pop();
        outcome
    }

    fn run_level<'g>(
        &'g self,
        chain: &mut Vec<&'g Group>,
        config: &RunConfig,
        state: &mut RunState,
    ) -> Result<RunSummary, ExemplarError> {
        debug!(group = %self.full_description, "running group");
        let mut summary = RunSummary::default();
        let mut group_ctx = GroupContext::new(self);

        let mut setup_fault = None;
        for hook in self.hooks.group_hooks(Phase::Before) {
            if let Err(fault) = hook(&mut group_ctx) {
                let fault = group_level(fault);
                if fault.is_usage() {
                    return Err(ExemplarError::Usage(fault));
                }
                setup_fault = Some(fault);
                break;
            }
        }

        match setup_fault {
            Some(fault) => {
                warn!(group = %self.full_description, fault = %fault, "before(all) hook failed");
                self.fail_all(&fault, config, state, &mut summary);
            }
            None => {
                let runner = ExampleRunner::new(chain.as_slice());
                for example in &self.examples {
                    if state.halted || !config.selects(&example.metadata()) {
                        summary.record(Status::NotRun);
                        continue;
                    }
                    let result = runner.run(example);
                    summary.record(result.status());
                    if config.fail_fast && result.is_failed() {
                        state.halted = true;
                    }
                }
                for child in &self.children {
                    summary.merge(child.run_in(chain, config, state)?);
                }
            }
        }

        for hook in self.hooks.group_hooks(Phase::After) {
            if let Err(fault) = hook(&mut group_ctx) {
                let fault = group_level(fault);
                if fault.is_usage() {
                    return Err(ExemplarError::Usage(fault));
                }
                warn!(group = %self.full_description, fault = %fault, "after(all) hook failed");
            }
        }

        Ok(summary)
    }

    /// Fails every selected example in this subtree with `fault`.
    fn fail_all(
        &self,
        fault: &Fault,
        config: &RunConfig,
        state: &mut RunState,
        summary: &mut RunSummary,
    ) {
        for example in &self.examples {
            if state.halted || !config.selects(&example.metadata()) {
                summary.record(Status::NotRun);
                continue;
            }
            example.finalize(ExecutionResult::failed_with(fault.clone()));
            summary.record(Status::Failed);
            if config.fail_fast {
                state.halted = true;
            }
        }
        for child in &self.children {
            child.fail_all(fault, config, state, summary);
        }
    }
}

/// A pending signal from an all-scoped hook has no example to mark.
fn group_level(fault: Fault) -> Fault {
    if fault.is_pending() {
        no_execution_context()
    } else {
        fault
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("description", &self.description)
            .field("hooks", &self.hooks)
            .field("examples", &self.examples)
            .field("groups", &self.children)
            .finish()
    }
}
