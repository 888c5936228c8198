//! End-to-end suites that drive several crates together: spreadsheet
//! ingest, storage, spinning, persistence and rendering.

use std::panic::{AssertUnwindSafe, catch_unwind};

pub use spinwheel_lib::testing::{TestRunSummary, TestSuiteDesc, TestSuiteResult};
use spinwheel_lib::klog_info;

pub mod persistence_tests;
pub mod pipeline_tests;

/// Every suite this crate defines, in run order.
pub static SUITES: &[&TestSuiteDesc] = &[
    &pipeline_tests::PIPELINE_SUITE_DESC,
    &persistence_tests::PERSISTENCE_SUITE_DESC,
];

/// Run `suites` one after another. A panicking suite counts as one failure
/// and does not stop the rest.
pub fn tests_run_all(suites: &[&TestSuiteDesc]) -> TestRunSummary {
    klog_info!("TESTS: starting {} suites", suites.len());
    let mut summary = TestRunSummary::default();

    for (idx, desc) in suites.iter().enumerate() {
        let res = match catch_unwind(AssertUnwindSafe(desc.run)) {
            Ok(res) => res,
            Err(_) => {
                klog_info!("TESTS: suite {} panicked, continuing", desc.name);
                let mut res = TestSuiteResult::new(desc.name);
                res.fill(0, 1, 0);
                res
            }
        };
        klog_info!(
            "SUITE{} {} total={} pass={} fail={} elapsed={}ms",
            idx,
            res.name,
            res.total,
            res.passed,
            res.failed,
            res.elapsed_ms,
        );
        summary.add_suite_result(&res);
    }

    klog_info!(
        "TESTS SUMMARY: total={} passed={} failed={} elapsed_ms={}",
        summary.total_tests,
        summary.passed,
        summary.failed,
        summary.elapsed_ms,
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_panics() -> TestSuiteResult {
        panic!("boom")
    }

    static PANICKY: TestSuiteDesc = TestSuiteDesc {
        name: "panicky",
        run: always_panics,
    };

    #[test]
    fn panicking_suite_is_counted_as_failed() {
        let summary = tests_run_all(&[&PANICKY, &pipeline_tests::PIPELINE_SUITE_DESC]);
        assert_eq!(summary.suites.len(), 2);
        assert_eq!(summary.suites[0].failed, 1);
        assert!(summary.suites[1].all_passed());
        assert!(!summary.all_passed());
    }
}
