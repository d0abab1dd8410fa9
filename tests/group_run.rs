//! Group runs: all-scoped hooks, filtering, fail-fast and summaries.

mod common;

use common::Trace;
use exemplar::prelude::*;

#[cfg(test)]
mod before_all_tests {
    use super::*;

    #[test]
    fn test_before_all_failure_fails_the_subtree() {
        let trace = Trace::new();
        let mut group = Group::new("broken setup");
        {
            let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());
            group
                .before_all(|_| Err(fault!(Runtime, "database unavailable")))
                .after_all(move |_| {
                    t1.push("after all");
                    Ok(())
                })
                .example("a", move |_| {
                    t2.push("a");
                    Ok(())
                })
                .describe("nested", move |nested| {
                    nested.example("b", move |_| {
                        t3.push("b");
                        Ok(())
                    });
                });
        }

        let summary = group.run().unwrap();

        assert_eq!(trace.entries(), vec!["after all"]);
        assert_eq!(summary.failed, 2);
        let nested = &group.groups()[0].examples()[0];
        assert_eq!(
            nested.execution_result().exception().unwrap().message(),
            "database unavailable"
        );
    }

    #[test]
    fn test_group_context_exposes_group_data() {
        let seen = Trace::new();
        let mut group = Group::with_metadata("suite", Metadata::new().with("db", "sqlite"));
        {
            let seen = seen.clone();
            group
                .before_all(move |ctx| {
                    seen.push(ctx.description());
                    let db = ctx.metadata().get("db").and_then(Value::as_str).unwrap_or("");
                    seen.push(db);
                    Ok(())
                })
                .example("x", |_| Ok(()));
        }

        group.run().unwrap();

        assert_eq!(seen.entries(), vec!["suite", "sqlite"]);
    }

    #[test]
    fn test_usage_fault_in_after_all_is_surfaced() {
        let mut group = Group::new("bad teardown");
        group
            .after_all(|ctx| ctx.mark_pending())
            .example("x", |_| Ok(()));

        let err = group.run().unwrap_err();

        assert!(matches!(err, ExemplarError::Usage(_)));
        assert!(group.examples()[0].execution_result().is_passed());
    }

    #[test]
    fn test_runtime_fault_in_after_all_is_not_an_error() {
        let mut group = Group::new("noisy teardown");
        group
            .after_all(|_| Err(fault!(Runtime, "cleanup failed")))
            .example("x", |_| Ok(()));

        let summary = group.run().unwrap();

        assert!(summary.is_success());
    }

    #[test]
    fn test_nested_before_all_runs_once_per_group() {
        let trace = Trace::new();
        let mut outer = Group::new("outer");
        {
            let t = trace.clone();
            outer.before_all(move |ctx| {
                t.push(&format!("before all {}", ctx.description()));
                Ok(())
            });
        }
        {
            let trace = trace.clone();
            outer.describe("inner", move |inner| {
                let t = trace.clone();
                inner
                    .before_all(move |ctx| {
                        t.push(&format!("before all {}", ctx.description()));
                        Ok(())
                    })
                    .example("one", |_| Ok(()))
                    .example("two", |_| Ok(()));
            });
        }

        outer.run().unwrap();

        assert_eq!(trace.entries(), vec!["before all outer", "before all inner"]);
    }
}

#[cfg(test)]
mod registration_tests {
    use super::*;

    #[test]
    fn test_register_through_group() {
        let trace = Trace::new();
        let mut group = Group::new("explicit");
        {
            let t = trace.clone();
            group
                .register(
                    Scope::Each,
                    Phase::Before,
                    Hook::example(move |_| {
                        t.push("registered");
                        Ok(())
                    }),
                )
                .unwrap()
                .example("x", |_| Ok(()));
        }

        group.run().unwrap();

        assert_eq!(trace.entries(), vec!["registered"]);
    }

    #[test]
    fn test_register_shape_mismatch() {
        let mut group = Group::new("mismatch");
        let err = group
            .register(Scope::Each, Phase::Around, Hook::group(|_| Ok(())))
            .unwrap_err();

        assert!(err.is_usage());
        assert_eq!(group.hooks().len(Scope::Each, Phase::Around), 0);
    }

    #[test]
    fn test_resolve_walks_the_chain() {
        let mut outer = Group::new("outer");
        outer.before_each(|_| Ok(()));
        outer.describe("inner", |inner| {
            inner.before_each(|_| Ok(())).before_each(|_| Ok(()));
        });

        let inner = &outer.groups()[0];
        let hooks = HookRegistry::resolve(&[outer.hooks(), inner.hooks()], Scope::Each, Phase::Before);
        assert_eq!(hooks.len(), 3);
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    fn tagged_group(trace: &Trace) -> Group {
        let mut group = Group::new("tagged");
        for (name, meta) in [
            ("focused", Metadata::new().with("focus", true)),
            ("slow", Metadata::new().with("speed", Value::symbol("slow"))),
            ("plain", Metadata::new()),
        ] {
            let t = trace.clone();
            group.example_with(name, meta, move |_| {
                t.push(name);
                Ok(())
            });
        }
        group
    }

    #[test]
    fn test_inclusion_filter() {
        let trace = Trace::new();
        let group = tagged_group(&trace);
        let config = RunConfig::default().including(MetadataFilter::new("focus", true));

        let summary = group.run_with(&config).unwrap();

        assert_eq!(trace.entries(), vec!["focused"]);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(group.examples()[1].execution_result().status(), Status::NotRun);
    }

    #[test]
    fn test_exclusion_filter_from_yaml() {
        let trace = Trace::new();
        let group = tagged_group(&trace);
        let config = RunConfig::from_yaml_str("exclusion_filter:\n  key: speed\n  value: slow\n").unwrap();

        let summary = group.run_with(&config).unwrap();

        assert_eq!(trace.entries(), vec!["focused", "plain"]);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_fail_fast_skips_the_rest() {
        let trace = Trace::new();
        let mut group = Group::new("fail fast");
        {
            let t = trace.clone();
            group
                .example("fails", |_| Err(fault!(Runtime, "boom")))
                .example("skipped", move |_| {
                    t.push("ran");
                    Ok(())
                })
                .describe("nested", |nested| {
                    nested.example("also skipped", |_| Ok(()));
                });
        }

        let summary = group
            .run_with(&RunConfig::default().with_fail_fast(true))
            .unwrap();

        assert!(trace.entries().is_empty());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_summary_over_mixed_results() {
        let mut group = Group::new("mixed");
        group
            .example("passes", |_| Ok(()))
            .example("fails", |_| Err(fault!(Assertion, "nope")))
            .example("pending", |ctx| ctx.mark_pending())
            .pending_example("todo");

        let summary = group.run().unwrap();

        assert_eq!(
            summary,
            RunSummary {
                passed: 1,
                failed: 1,
                pending: 2,
                skipped: 0,
            }
        );
        assert!(!summary.is_success());
    }

    #[test]
    fn test_result_json_for_reporters() {
        let mut group = Group::new("json");
        group.example("fails", |_| Err(fault!(Runtime, "FOO")));
        group.run().unwrap();

        let json = group.examples()[0].execution_result().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["status"], "failed");
        assert_eq!(parsed["exception_encountered"]["message"], "FOO");
        assert_eq!(parsed["exception_encountered"]["kind"], "runtime");
    }
}
