use spinwheel_lib::testing::TestResult;
use spinwheel_lib::{assert_eq_test, assert_test, define_test_suite, pass};

use crate::scheduler::{Scheduler, TimerQueue};

#[derive(Default)]
struct Counters {
    fast: u32,
    slow: u32,
    last_now: u64,
}

pub fn test_fires_on_interval() -> TestResult {
    let mut queue: TimerQueue<Counters> = TimerQueue::new();
    let mut ctx = Counters::default();
    queue.schedule_periodic(
        50,
        0,
        Box::new(|c: &mut Counters, now| {
            c.fast += 1;
            c.last_now = now;
        }),
    );

    assert_eq_test!(queue.run_due(49, &mut ctx), 0);
    assert_eq_test!(queue.run_due(50, &mut ctx), 1);
    assert_eq_test!(queue.run_due(99, &mut ctx), 0);
    assert_eq_test!(queue.run_due(100, &mut ctx), 1);
    assert_eq_test!(ctx.fast, 2);
    assert_eq_test!(ctx.last_now, 100);
    pass!()
}

pub fn test_missed_ticks_coalesce() -> TestResult {
    let mut queue: TimerQueue<Counters> = TimerQueue::new();
    let mut ctx = Counters::default();
    queue.schedule_periodic(50, 0, Box::new(|c: &mut Counters, _| c.fast += 1));

    assert_eq_test!(queue.run_due(50, &mut ctx), 1);
    assert_eq_test!(queue.run_due(300, &mut ctx), 1, "a late frame fires once");
    assert_eq_test!(queue.run_due(349, &mut ctx), 0);
    assert_eq_test!(queue.run_due(350, &mut ctx), 1);
    assert_eq_test!(ctx.fast, 3);
    pass!()
}

pub fn test_cancel_disarms() -> TestResult {
    let mut queue: TimerQueue<Counters> = TimerQueue::new();
    let mut ctx = Counters::default();
    let fast = queue.schedule_periodic(10, 0, Box::new(|c: &mut Counters, _| c.fast += 1));
    let slow = queue.schedule_periodic(100, 0, Box::new(|c: &mut Counters, _| c.slow += 1));
    assert_test!(queue.is_armed(fast) && queue.is_armed(slow));
    assert_eq_test!(queue.len(), 2);

    queue.run_due(100, &mut ctx);
    assert_eq_test!((ctx.fast, ctx.slow), (1, 1));

    assert_test!(queue.cancel(fast));
    assert_test!(!queue.cancel(fast), "second cancel reports nothing armed");
    assert_test!(!queue.is_armed(fast));

    queue.run_due(200, &mut ctx);
    assert_eq_test!((ctx.fast, ctx.slow), (1, 2));

    queue.clear();
    assert_test!(queue.is_empty());
    assert_eq_test!(queue.run_due(10_000, &mut ctx), 0);
    pass!()
}

pub fn test_zero_interval_is_clamped() -> TestResult {
    let mut queue: TimerQueue<Counters> = TimerQueue::new();
    let mut ctx = Counters::default();
    queue.schedule_periodic(0, 5, Box::new(|c: &mut Counters, _| c.fast += 1));
    assert_eq_test!(queue.run_due(5, &mut ctx), 0);
    assert_eq_test!(queue.run_due(6, &mut ctx), 1);
    assert_eq_test!(queue.run_due(6, &mut ctx), 0, "fires at most once per deadline");
    pass!()
}

define_test_suite!(
    core_scheduler,
    [
        test_fires_on_interval,
        test_missed_ticks_coalesce,
        test_cancel_disarms,
        test_zero_interval_is_clamped,
    ]
);
