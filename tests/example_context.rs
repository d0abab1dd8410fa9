//! What a running example can see: description, metadata, options, in-block state.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Flag, Trace};
use exemplar::prelude::*;

#[cfg(test)]
mod metadata_access_tests {
    use super::*;

    #[test]
    fn test_example_has_a_reference_to_itself() {
        let seen = Trace::new();
        let mut group = Group::new("accessing metadata within a running example");
        {
            let seen = seen.clone();
            group.example("should have a reference to itself when running", move |ctx| {
                seen.push(ctx.description());
                Ok(())
            });
        }

        group.run().unwrap();

        assert_eq!(
            seen.entries(),
            vec!["should have a reference to itself when running"]
        );
    }

    #[test]
    fn test_group_metadata_is_visible_as_the_examples_own() {
        let checked = Flag::new();
        let mut group = Group::with_metadata(
            "Example",
            Metadata::new().with("parent_metadata", "sample"),
        );
        {
            let checked = checked.clone();
            group.describe("accessing metadata", move |inner| {
                inner.example("sees parent metadata", move |ctx| {
                    let expected = Metadata::new().with("parent_metadata", "sample");
                    ensure!(ctx.group_metadata().includes(&expected));
                    ensure!(ctx.metadata().includes(&expected));
                    checked.set();
                    Ok(())
                });
            });
        }

        group.run().unwrap();

        assert!(checked.get());
        assert!(group.groups()[0].examples()[0].execution_result().is_passed());
    }

    #[test]
    fn test_options_lookup_by_key() {
        let mut group = Group::new("accessing options within a running example");
        group.example_with(
            "should be able to look up option values by key",
            Metadata::new().with("demo", Value::symbol("data")),
            |ctx| {
                ensure_eq!(ctx.options().get("demo"), Some(&Value::symbol("data")));
                ensure!(ctx.option("missing").is_none());
                Ok(())
            },
        );

        group.run().unwrap();

        assert!(group.examples()[0].execution_result().is_passed());
    }

    #[test]
    fn test_merged_metadata_is_exact_union() {
        let captured: Rc<RefCell<Option<Metadata>>> = Rc::new(RefCell::new(None));
        let mut group = Group::with_metadata(
            "union",
            Metadata::new().with("shared", "group").with("group_only", 1_i64),
        );
        {
            let captured = captured.clone();
            group.example_with(
                "collides",
                Metadata::new().with("shared", "example").with("example_only", true),
                move |ctx| {
                    *captured.borrow_mut() = Some(ctx.metadata().clone());
                    Ok(())
                },
            );
        }

        group.run().unwrap();

        let meta = captured.borrow().clone().expect("metadata captured");
        assert_eq!(meta.get("shared"), Some(&Value::from("example")));
        assert_eq!(meta.get("group_only"), Some(&Value::from(1_i64)));
        assert_eq!(meta.get("example_only"), Some(&Value::Bool(true)));
        assert_eq!(meta.get("description"), Some(&Value::from("collides")));
        assert_eq!(meta.get("full_description"), Some(&Value::from("union collides")));
        assert_eq!(meta.len(), 5);
    }

    #[test]
    fn test_full_description_spans_nested_groups() {
        let mut group = Group::new("outer");
        group.describe("middle", |middle| {
            middle.describe("inner", |inner| {
                inner.example("works", |_| Ok(()));
            });
        });

        let example = &group.groups()[0].groups()[0].examples()[0];
        assert_eq!(example.full_description(), "outer middle inner works");
        assert_eq!(group.groups()[0].full_description(), "outer middle");
    }
}

#[cfg(test)]
mod in_block_tests {
    use super::*;

    #[test]
    fn test_in_block_only_during_the_example() {
        let trace = Trace::new();
        let mut group = Group::new("#in_block?");
        {
            let (t1, t2, t3, t4) = (trace.clone(), trace.clone(), trace.clone(), trace.clone());
            group
                .around_each(move |ctx, e| {
                    t1.push(&format!("around {}", ctx.in_block()));
                    e.run(ctx);
                    t1.push(&format!("around {}", ctx.in_block()));
                    Ok(())
                })
                .before_each(move |ctx| {
                    t2.push(&format!("before {}", ctx.in_block()));
                    Ok(())
                })
                .after_each(move |ctx| {
                    t3.push(&format!("after {}", ctx.in_block()));
                    Ok(())
                })
                .example("is only true during the example", move |ctx| {
                    t4.push(&format!("example {}", ctx.in_block()));
                    Ok(())
                });
        }

        assert!(!group.examples()[0].in_block());
        group.run().unwrap();
        assert!(!group.examples()[0].in_block());

        assert_eq!(
            trace.entries(),
            vec![
                "around false",
                "before false",
                "example true",
                "after false",
                "around false",
            ]
        );
    }

    #[test]
    fn test_in_block_resets_after_a_faulting_body() {
        let during = Flag::new();
        let after = Flag::new();
        let mut group = Group::new("faulting");
        {
            let (during, after) = (during.clone(), after.clone());
            group
                .after_each(move |ctx| {
                    after.record(ctx.in_block());
                    Ok(())
                })
                .example("raises", move |ctx| {
                    during.record(ctx.in_block());
                    Err(fault!(Runtime, "this error"))
                });
        }

        group.run().unwrap();

        assert!(during.get());
        assert!(!after.get());
        assert!(!group.examples()[0].in_block());
    }
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    #[test]
    fn test_runner_runs_one_example_directly() {
        let mut group = Group::new("direct");
        group
            .before_each(|ctx| ctx.mark_pending())
            .example("a", |_| Ok(()));

        let chain = [&group];
        let result = ExampleRunner::new(&chain).run(&group.examples()[0]);

        assert!(result.is_pending());
        assert_eq!(group.examples()[0].execution_result(), result);
    }

    #[test]
    fn test_rerun_replaces_the_previous_result() {
        let mut group = Group::new("rerun");
        group.example("a", |ctx| {
            ensure!(!ctx.metadata().contains_key(EXECUTION_RESULT_KEY));
            Ok(())
        });

        group.run().unwrap();
        group.run().unwrap();

        let example = &group.examples()[0];
        assert!(example.execution_result().is_passed());
        assert!(example.metadata().contains_key(EXECUTION_RESULT_KEY));
    }
}
