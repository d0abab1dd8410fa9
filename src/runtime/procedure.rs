//! The wrapped unit an around hook receives.
//!
//! Around hooks nest: the handle given to the outermost hook runs the next
//! hook in, and the handle given to the innermost hook runs the core unit
//! (each-scoped before hooks, the body, each-scoped after hooks).

use std::rc::Rc;

use tracing::debug;

use crate::example::{Example, InBlockGuard};
use crate::hooks::{AroundHookFn, ExampleHookFn};
use crate::runtime::context::ExampleContext;

/// before(each) hooks, body, after(each) hooks for one example.
pub(crate) struct CoreUnit<'a> {
    pub(crate) example: &'a Example,
    pub(crate) before: &'a [Rc<ExampleHookFn>],
    pub(crate) after: &'a [Rc<ExampleHookFn>],
}

impl CoreUnit<'_> {
    pub(crate) fn run(&self, ctx: &mut ExampleContext<'_>) {
        // Setup and body stop at the first fault or pending declaration.
        for hook in self.before {
            if ctx.halted() {
                break;
            }
            if let Err(fault) = hook(ctx) {
                ctx.record_fault(fault);
            }
        }

        if !ctx.halted() {
            match self.example.body() {
                Some(body) => {
                    let _in_block = InBlockGuard::enter(self.example.in_block_flag());
                    if let Err(fault) = body(ctx) {
                        ctx.record_fault(fault);
                    }
                }
                None => ctx.mark_not_implemented(),
            }
        }
        ctx.end_body();

        // Every after hook runs, whatever happened above.
        for hook in self.after {
            if let Err(fault) = hook(ctx) {
                ctx.record_fault(fault);
            }
        }
    }
}

/// Handle to the rest of the chain; call [`run`](Procedure::run) to proceed.
///
/// A hook that never calls `run` skips the example entirely. Calling it a
/// second time is ignored.
pub struct Procedure<'a> {
    remaining: &'a [Rc<AroundHookFn>],
    core: &'a CoreUnit<'a>,
    invoked: bool,
}

impl<'a> Procedure<'a> {
    pub(crate) fn new(remaining: &'a [Rc<AroundHookFn>], core: &'a CoreUnit<'a>) -> Self {
        Self {
            remaining,
            core,
            invoked: false,
        }
    }

    pub fn run(&mut self, ctx: &mut ExampleContext<'_>) {
        if self.invoked {
            debug!(
                example = %ctx.full_description(),
                "ignoring repeated run of a wrapped example"
            );
            return;
        }
        self.invoked = true;

        match self.remaining.split_first() {
            None => self.core.run(ctx),
            Some((hook, rest)) => {
                let mut inner = Procedure::new(rest, self.core);
                if let Err(fault) = hook(ctx, &mut inner) {
                    ctx.record_fault(fault);
                }
            }
        }
    }

    pub fn was_invoked(&self) -> bool {
        self.invoked
    }
}
