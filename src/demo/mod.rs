//! Built-in sample module
//!
//! Exercised by the binary when no other module is registered. Covers the
//! marker combinations the runner supports: parametrized cases, repeats,
//! flaky retries, ignores, lifecycle hooks and parallel classes.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::assertion::{confirm_equal, confirm_in_range, confirm_true};
use crate::metadata::{
    IgnoreMode, IgnorePolicy, LifecycleRole, MethodDecl, ParamKind, RepeatPolicy, TestModule,
    TypeDecl, Value,
};

fn int(args: &[Value], index: usize) -> i64 {
    args.get(index).and_then(Value::as_i64).unwrap_or_default()
}

/// Sample module with one class per feature
pub fn demo_module() -> TestModule {
    TestModule::new("demo")
        .register(arithmetic())
        .register(strings())
        .register(flaky())
        .register(lifecycle())
        .register(editor_only())
}

fn arithmetic() -> TypeDecl {
    TypeDecl::new("ArithmeticTests")
        .test_class()
        .parallelizable()
        .method(
            MethodDecl::new("adds", |args| {
                confirm_equal(int(args, 0) + int(args, 1), int(args, 2))?;
                Ok(())
            })
            .params([ParamKind::Int, ParamKind::Int, ParamKind::Int])
            .display_name("Adds two numbers")
            .category("math")
            .case([1, 2, 3])
            .case([1_000, 1_000, 2_000])
            .repeat(RepeatPolicy::repeat(2))
            .case([-4, 4, 0]),
        )
        .method(
            MethodDecl::new("in_range", |args| {
                confirm_in_range(int(args, 0), 0, 100)?;
                Ok(())
            })
            .params([ParamKind::Int])
            .category("math")
            .case([0])
            .case([42])
            .case([100]),
        )
}

fn strings() -> TypeDecl {
    TypeDecl::new("StringTests")
        .test_class()
        .parallelizable()
        .method(
            MethodDecl::new("non_empty", |args| {
                let text = args.first().and_then(Value::as_str).unwrap_or_default();
                confirm_true(!text.is_empty())?;
                Ok(())
            })
            .params([ParamKind::Str])
            .case(["alpha"])
            .case(["beta"]),
        )
        .method(
            MethodDecl::unit("unicode_width", || {
                confirm_equal("héllo".chars().count() as i64, 5)?;
                Ok(())
            })
            .test()
            .ignore(IgnorePolicy::always().with_reason("Width tables not bundled")),
        )
}

fn flaky() -> TypeDecl {
    let attempts = Arc::new(AtomicU32::new(0));

    TypeDecl::new("FlakyTests").test_class().method(
        MethodDecl::unit("eventually_ready", move || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            anyhow::ensure!(attempt >= 3, "service not ready on attempt {}", attempt);
            Ok(())
        })
        .repeat(RepeatPolicy::flaky(3, Duration::from_millis(10)))
        .test(),
    )
}

fn lifecycle() -> TypeDecl {
    let connections = Arc::new(AtomicI64::new(0));
    let opened = connections.clone();
    let closed = connections.clone();
    let used = connections.clone();
    let checked = connections;

    TypeDecl::new("LifecycleTests")
        .test_class()
        .method(
            MethodDecl::unit("open", move || {
                opened.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .lifecycle(LifecycleRole::BeforeAll),
        )
        .method(
            MethodDecl::unit("uses_connection", move || {
                confirm_equal(used.load(Ordering::SeqCst), 1)?;
                Ok(())
            })
            .test()
            .test(),
        )
        .method(
            MethodDecl::unit("close", move || {
                confirm_equal(checked.load(Ordering::SeqCst), 1)?;
                closed.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .lifecycle(LifecycleRole::AfterAll),
        )
}

fn editor_only() -> TypeDecl {
    TypeDecl::new("EditorTests")
        .test_class()
        .ignore(
            IgnorePolicy::new(IgnoreMode::InHeadlessOnly).with_reason("Needs the editor"),
        )
        .method(MethodDecl::unit("scene_loads", || Ok(())).test())
}
