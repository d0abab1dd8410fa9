//! # Hook Registry
//!
//! Ordered storage of before/after/around callbacks, keyed by [`Scope`] and
//! [`Phase`]. A registry belongs to exactly one group; hooks that apply to an
//! example are found by walking the group chain from the outermost group in.
//!
//! ## Ordering
//!
//! - **before**: outermost group first, registration order within a group
//! - **after**: innermost group first, reverse registration order within a group
//! - **around**: outermost group wraps outermost, first registered wraps the rest

use std::fmt;
use std::rc::Rc;

use crate::diagnostics::Fault;
use crate::runtime::context::{ExampleContext, GroupContext};
use crate::runtime::procedure::Procedure;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Each-scoped before/after hook: runs once per example with its context.
pub type ExampleHookFn = dyn Fn(&mut ExampleContext<'_>) -> Result<(), Fault>;
/// All-scoped before/after hook: runs once per group, outside any example.
pub type GroupHookFn = dyn Fn(&mut GroupContext<'_>) -> Result<(), Fault>;
/// Around hook: receives the wrapped unit and must call [`Procedure::run`].
pub type AroundHookFn = dyn Fn(&mut ExampleContext<'_>, &mut Procedure<'_>) -> Result<(), Fault>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Once per example
    Each,
    /// Once per group
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
    Around,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Each => write!(f, "each"),
            Scope::All => write!(f, "all"),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Before => write!(f, "before"),
            Phase::After => write!(f, "after"),
            Phase::Around => write!(f, "around"),
        }
    }
}

/// A registered callable, tagged by the context it expects.
#[derive(Clone)]
pub enum Hook {
    Example(Rc<ExampleHookFn>),
    Group(Rc<GroupHookFn>),
    Around(Rc<AroundHookFn>),
}

impl Hook {
    pub fn example<F>(f: F) -> Self
    where
        F: Fn(&mut ExampleContext<'_>) -> Result<(), Fault> + 'static,
    {
        Hook::Example(Rc::new(f))
    }

    pub fn group<F>(f: F) -> Self
    where
        F: Fn(&mut GroupContext<'_>) -> Result<(), Fault> + 'static,
    {
        Hook::Group(Rc::new(f))
    }

    pub fn around<F>(f: F) -> Self
    where
        F: Fn(&mut ExampleContext<'_>, &mut Procedure<'_>) -> Result<(), Fault> + 'static,
    {
        Hook::Around(Rc::new(f))
    }

    fn shape(&self) -> &'static str {
        match self {
            Hook::Example(_) => "example hook",
            Hook::Group(_) => "group hook",
            Hook::Around(_) => "around hook",
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({})", self.shape())
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Clone, Default)]
pub struct HookRegistry {
    before_each: Vec<Rc<ExampleHookFn>>,
    after_each: Vec<Rc<ExampleHookFn>>,
    around_each: Vec<Rc<AroundHookFn>>,
    before_all: Vec<Rc<GroupHookFn>>,
    after_all: Vec<Rc<GroupHookFn>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook` to the (scope, phase) list.
    ///
    /// Fails with a usage fault when the hook's shape does not fit the slot,
    /// including any attempt to register an all-scoped around hook.
    pub fn register(&mut self, scope: Scope, phase: Phase, hook: Hook) -> Result<(), Fault> {
        match (scope, phase, hook) {
            (Scope::Each, Phase::Before, Hook::Example(f)) => self.before_each.push(f),
            (Scope::Each, Phase::After, Hook::Example(f)) => self.after_each.push(f),
            (Scope::Each, Phase::Around, Hook::Around(f)) => self.around_each.push(f),
            (Scope::All, Phase::Before, Hook::Group(f)) => self.before_all.push(f),
            (Scope::All, Phase::After, Hook::Group(f)) => self.after_all.push(f),
            (Scope::All, Phase::Around, _) => {
                return Err(Fault::usage_with_help(
                    "around(all) hooks are not supported",
                    "wrap each example with an around(each) hook instead",
                ))
            }
            (scope, phase, hook) => {
                return Err(Fault::usage(format!(
                    "cannot register a {} as {}({})",
                    hook.shape(),
                    phase,
                    scope
                )))
            }
        }
        Ok(())
    }

    /// Ordered hooks applicable to an example in the innermost group of `chain`.
    ///
    /// `chain` lists the registries of the group ancestry, outermost first.
    pub fn resolve(chain: &[&HookRegistry], scope: Scope, phase: Phase) -> Vec<Hook> {
        match (scope, phase) {
            (Scope::Each, Phase::Around) => Self::resolve_around(chain)
                .into_iter()
                .map(Hook::Around)
                .collect(),
            (Scope::Each, phase) => Self::resolve_each(chain, phase)
                .into_iter()
                .map(Hook::Example)
                .collect(),
            (Scope::All, Phase::Around) => Vec::new(),
            (Scope::All, phase) => Self::resolve_all(chain, phase)
                .into_iter()
                .map(Hook::Group)
                .collect(),
        }
    }

    pub(crate) fn resolve_each(chain: &[&HookRegistry], phase: Phase) -> Vec<Rc<ExampleHookFn>> {
        match phase {
            Phase::Before => chain
                .iter()
                .flat_map(|r| r.before_each.iter().cloned())
                .collect(),
            Phase::After => chain
                .iter()
                .rev()
                .flat_map(|r| r.after_each.iter().rev().cloned())
                .collect(),
            Phase::Around => Vec::new(),
        }
    }

    pub(crate) fn resolve_around(chain: &[&HookRegistry]) -> Vec<Rc<AroundHookFn>> {
        chain
            .iter()
            .flat_map(|r| r.around_each.iter().cloned())
            .collect()
    }

    fn resolve_all(chain: &[&HookRegistry], phase: Phase) -> Vec<Rc<GroupHookFn>> {
        match phase {
            Phase::Before => chain
                .iter()
                .flat_map(|r| r.before_all.iter().cloned())
                .collect(),
            Phase::After => chain
                .iter()
                .rev()
                .flat_map(|r| r.after_all.iter().rev().cloned())
                .collect(),
            Phase::Around => Vec::new(),
        }
    }

    /// This group's own all-scoped hooks, in run order for `phase`.
    pub(crate) fn group_hooks(&self, phase: Phase) -> Vec<Rc<GroupHookFn>> {
        Self::resolve_all(&[self], phase)
    }

    pub fn len(&self, scope: Scope, phase: Phase) -> usize {
        match (scope, phase) {
            (Scope::Each, Phase::Before) => self.before_each.len(),
            (Scope::Each, Phase::After) => self.after_each.len(),
            (Scope::Each, Phase::Around) => self.around_each.len(),
            (Scope::All, Phase::Before) => self.before_all.len(),
            (Scope::All, Phase::After) => self.after_all.len(),
            (Scope::All, Phase::Around) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before_each.is_empty()
            && self.after_each.is_empty()
            && self.around_each.is_empty()
            && self.before_all.is_empty()
            && self.after_all.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before_each", &self.before_each.len())
            .field("after_each", &self.after_each.len())
            .field("around_each", &self.around_each.len())
            .field("before_all", &self.before_all.len())
            .field("after_all", &self.after_all.len())
            .finish()
    }
}
