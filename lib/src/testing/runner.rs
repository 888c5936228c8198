use std::panic::{AssertUnwindSafe, catch_unwind};

use super::TestResult;
use crate::klog_info;

/// Run one test, turning a panic into [`TestResult::Panic`].
pub fn run_single_test<F>(name: &str, test: F) -> TestResult
where
    F: FnOnce() -> TestResult,
{
    let result = catch_unwind(AssertUnwindSafe(test)).unwrap_or(TestResult::Panic);
    match result {
        TestResult::Pass => {}
        TestResult::Skipped => klog_info!("TEST {}: skipped", name),
        TestResult::Fail => klog_info!("TEST {}: FAIL", name),
        TestResult::Panic => klog_info!("TEST {}: PANIC", name),
    }
    result
}
