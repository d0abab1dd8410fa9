use tracing::{debug, trace};

use crate::example::Example;
use crate::group::Group;
use crate::hooks::{HookRegistry, Phase};
use crate::metadata::Metadata;
use crate::result::ExecutionResult;
use crate::runtime::context::ExampleContext;
use crate::runtime::procedure::{CoreUnit, Procedure};

/// Runs single examples against a group chain.
///
/// `chain` is the ancestry of the owning group, outermost first; the last
/// entry owns the examples handed to [`run`](ExampleRunner::run).
pub struct ExampleRunner<'g> {
    chain: &'g [&'g Group],
}

impl<'g> ExampleRunner<'g> {
    pub fn new(chain: &'g [&'g Group]) -> Self {
        Self { chain }
    }

    /// Runs `example` to completion and seals its result.
    ///
    /// Faults from the body and from each-scoped hooks end up in the result;
    /// this never fails.
    pub fn run(&self, example: &Example) -> ExecutionResult {
        let registries: Vec<&HookRegistry> = self.chain.iter().map(|g| g.hooks()).collect();
        let around = HookRegistry::resolve_around(&registries);
        let before = HookRegistry::resolve_each(&registries, Phase::Before);
        let after = HookRegistry::resolve_each(&registries, Phase::After);
        trace!(
            around = around.len(),
            before = before.len(),
            after = after.len(),
            "resolved hooks"
        );

        let group_metadata = self
            .chain
            .last()
            .map(|g| g.metadata().clone())
            .unwrap_or_else(Metadata::new);

        debug!(example = %example.full_description(), "running example");
        let mut ctx = ExampleContext::new(example, group_metadata);
        let core = CoreUnit {
            example,
            before: &before,
            after: &after,
        };
        Procedure::new(&around, &core).run(&mut ctx);

        let result = ctx.finish();
        example.finalize(result.clone());
        debug!(
            example = %example.full_description(),
            status = %result.status(),
            "example finished"
        );
        result
    }
}
