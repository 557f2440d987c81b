#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

pub use wsrun_test_utils::builders::{PlanRequestBuilder, WorkspaceBuilder, WorkspaceFixture};
pub use wsrun_test_utils::fake_runner::{FakeBehaviour, FakeScriptRunner};
pub use wsrun_test_utils::{init_tracing, with_timeout};

pub use tokio_util::sync::CancellationToken;

use wsrun::RunOptions;
use wsrun::types::ExecutionMode;

/// A -> B -> C chain (B depends on A, C depends on B), all defining `build`.
pub fn abc_chain() -> WorkspaceFixture {
    WorkspaceBuilder::new()
        .package("a", &[], &["build"])
        .package("b", &["a"], &["build"])
        .package("c", &["b"], &["build"])
        .build()
}

pub fn sequential() -> RunOptions {
    RunOptions {
        mode: ExecutionMode::Sequential,
        stagger: Duration::ZERO,
        dry_run: false,
    }
}

pub fn staggered(stagger: Duration) -> RunOptions {
    RunOptions {
        mode: ExecutionMode::Parallel,
        stagger,
        dry_run: false,
    }
}

pub fn behaviours(entries: &[(&str, u64, Option<i32>)]) -> HashMap<String, FakeBehaviour> {
    entries
        .iter()
        .map(|(name, millis, exit_code)| {
            (
                name.to_string(),
                FakeBehaviour {
                    duration: Duration::from_millis(*millis),
                    exit_code: *exit_code,
                },
            )
        })
        .collect()
}

/// A shutdown token nobody fires.
pub fn no_shutdown() -> CancellationToken {
    CancellationToken::new()
}
