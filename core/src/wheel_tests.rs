use std::sync::{Arc, Mutex};

use serde_json::json;
use spinwheel_abi::{
    Color32, DesignatedWinner, EntrySet, EntrySetId, RawRecord, SpinMode, SpinResult, StoreError,
    StoreResult, WheelError, WheelFlags,
};
use spinwheel_lib::testing::TestResult;
use spinwheel_lib::{
    Clock, ManualClock, RotationPolicy, WheelConfig, assert_close, assert_eq_test, assert_err,
    assert_ok, assert_test, define_test_suite, fail, pass,
};

use crate::ledger::RemovalOutcome;
use crate::palette::{PALETTE, pointer_color, slice_color};
use crate::resolver::resolve;
use crate::state::{KEY_REMOVED, KEY_WINNERS, MemoryBackend, PersistBackend, StateStore};
use crate::wheel::SpinWheel;

fn test_config() -> WheelConfig {
    WheelConfig {
        spin_duration_ms: 1_000,
        seed: Some(17),
        ..WheelConfig::default()
    }
}

fn new_wheel(config: WheelConfig) -> Option<(SpinWheel, Arc<ManualClock>)> {
    let clock = Arc::new(ManualClock::starting_at(1_000));
    let wheel = SpinWheel::new(config, StateStore::in_memory(), clock.clone()).ok()?;
    Some((wheel, clock))
}

fn entry_set(id: u64, filename: &str, records: Vec<RawRecord>, clock: &ManualClock) -> EntrySet {
    EntrySet {
        id: EntrySetId(id),
        filename: filename.to_string(),
        entries: records,
        center_image: None,
        pinned_ticket: None,
        active: true,
        created_at: clock.now_utc(),
    }
}

fn ticketed_records(prefix: &str, count: usize, first_ticket: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| json!({ "First Name": format!("{}{}", prefix, i), "Ticket Number": first_ticket + i }))
        .collect()
}

/// Memory backend that refuses writes to one chosen key.
struct FailingWrites {
    inner: MemoryBackend,
    failing: Arc<Mutex<Option<&'static str>>>,
}

impl PersistBackend for FailingWrites {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let refuse = self.failing.lock().map(|k| *k == Some(key)).unwrap_or(false);
        if refuse {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.write(key, value)
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.inner.delete(key)
    }
}

/// Step the clock in display-sized frames until the spin lands.
fn run_spin(wheel: &mut SpinWheel, clock: &ManualClock) -> Option<SpinResult> {
    for _ in 0..1_000 {
        clock.advance(16);
        match wheel.frame() {
            Ok(Some(result)) => return Some(result),
            Ok(None) => {}
            Err(_) => return None,
        }
    }
    None
}

pub fn test_fixed_spin_on_placeholders() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    assert_eq_test!(wheel.pool().len(), 8);
    assert_ok!(wheel.set_spin_mode(1, SpinMode::Fixed));
    assert_test!(assert_ok!(wheel.designate_winner(1, DesignatedWinner::by_name("Beatriz"))));
    assert_test!(wheel.flags().contains(WheelFlags::FIXED_PENDING));

    let started = assert_ok!(wheel.spin());
    assert_eq_test!(started.spin_number, 1);
    assert_eq_test!(started.mode, SpinMode::Fixed);
    assert_test!(wheel.is_spinning());

    let Some(result) = run_spin(&mut wheel, clock.as_ref()) else {
        return fail!("spin never completed");
    };
    assert_eq_test!(result.winning_entry.name.as_str(), "Beatriz");
    assert_eq_test!(result.slice_index, 1);
    assert_eq_test!(result.color_index, 1);
    assert_eq_test!(result.spin_number, 1);
    assert_close!(wheel.rotation(), started.target_rotation, 1e-9);
    assert_test!(wheel.flags().contains(WheelFlags::RESULT_SHOWN));
    assert_eq_test!(assert_ok!(wheel.spin_count()), 1);
    assert_eq_test!(assert_ok!(wheel.state().winners()).len(), 1);
    pass!()
}

pub fn test_spin_gates() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    assert_ok!(wheel.spin());
    assert_eq_test!(assert_err!(wheel.spin()), WheelError::SpinInProgress);
    assert_eq_test!(assert_err!(wheel.reset_all()), WheelError::SpinInProgress);

    if run_spin(&mut wheel, clock.as_ref()).is_none() {
        return fail!("spin never completed");
    }
    assert_eq_test!(assert_err!(wheel.spin()), WheelError::ResultPending);
    assert_ok!(wheel.dismiss());
    assert_eq_test!(assert_err!(wheel.dismiss()), WheelError::NoWinner);
    assert_eq_test!(assert_ok!(wheel.spin()).spin_number, 2);
    assert_eq_test!(assert_err!(wheel.set_spin_mode(0, SpinMode::Fixed)), WheelError::InvalidSpinNumber(0));
    pass!()
}

pub fn test_random_result_matches_final_angle() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    for round in 0..5 {
        let started = assert_ok!(wheel.spin());
        assert_eq_test!(started.mode, SpinMode::Random);
        let committed = wheel.visible_batch().clone();
        let Some(result) = run_spin(&mut wheel, clock.as_ref()) else {
            return fail!("round {} never completed", round);
        };
        let Some(expected) = resolve(wheel.rotation(), &committed) else {
            return fail!("empty committed batch");
        };
        assert_eq_test!(result.winning_entry, expected.entry);
        assert_eq_test!(result.slice_index, expected.index_in_batch);
        assert_ok!(wheel.dismiss());
    }
    assert_eq_test!(wheel.results().len(), 5);
    pass!()
}

pub fn test_large_pool_batch_frozen_during_spin() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    let set = entry_set(1, "guests", ticketed_records("Guest", 250, 1000), clock.as_ref());
    assert_eq_test!(assert_ok!(wheel.load_entry_sets(vec![set])), 250);
    assert_eq_test!(wheel.visible_batch().len(), 100);

    assert_ok!(wheel.set_spin_mode(1, SpinMode::Fixed));
    assert_ok!(wheel.designate_winner(1, DesignatedWinner::by_ticket("1137")));
    assert_eq_test!(wheel.pending_winner(), Some(137));

    // Idle resampling keeps the designated entry at slot 0.
    clock.advance(200);
    assert_ok!(wheel.frame());
    assert_eq_test!(
        wheel.visible_batch().first().and_then(|e| e.identity_ticket()),
        Some("1137")
    );

    let started = assert_ok!(wheel.spin());
    assert_eq_test!(started.batch_len, 100);
    let committed = wheel.visible_batch().clone();
    for _ in 0..20 {
        clock.advance(16);
        assert_ok!(wheel.frame());
        assert_test!(wheel.visible_batch().same_snapshot(&committed), "batch changed mid-spin");
    }

    let Some(result) = run_spin(&mut wheel, clock.as_ref()) else {
        return fail!("spin never completed");
    };
    assert_eq_test!(result.winning_entry.identity_ticket(), Some("1137"));
    assert_eq_test!(result.slice_index, 0);
    pass!()
}

pub fn test_remove_winner_takes_one_duplicate() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    let records = vec![json!("Ana (1)"), json!("Ana (2)"), json!("Bruno (3)"), json!("Carla")];
    let set = entry_set(1, "dupes", records.clone(), clock.as_ref());
    assert_ok!(wheel.load_entry_sets(vec![set.clone()]));

    let refused = assert_ok!(wheel.remove_entry(None, "Ana"));
    assert_test!(matches!(refused, RemovalOutcome::Refused(_)), "two entries are named Ana");
    assert_eq_test!(wheel.pool().len(), 4);

    assert_ok!(wheel.set_spin_mode(1, SpinMode::Fixed));
    assert_ok!(wheel.designate_winner(1, DesignatedWinner::by_ticket("2")));
    assert_ok!(wheel.spin());
    let Some(result) = run_spin(&mut wheel, clock.as_ref()) else {
        return fail!("spin never completed");
    };
    assert_eq_test!(result.winning_entry.label(), "Ana (2)".to_string());

    let outcome = assert_ok!(wheel.remove_winner());
    assert_test!(outcome.is_removed());
    assert_eq_test!(wheel.pool().len(), 3);
    assert_eq_test!(wheel.pool().index_of_ticket("1"), Some(0), "the other Ana stays");
    assert_test!(!wheel.flags().contains(WheelFlags::RESULT_SHOWN), "removal dismisses");
    assert_eq_test!(assert_ok!(wheel.state().removed_entries()).len(), 1);

    // Reloading the same file keeps the removed ticket out.
    assert_eq_test!(assert_ok!(wheel.load_entry_sets(vec![set])), 3);

    let outcome = assert_ok!(wheel.remove_entry(None, "ana"));
    assert_test!(outcome.is_removed(), "the remaining Ana is now unique by name");
    assert_eq_test!(wheel.pool().len(), 2);
    pass!()
}

pub fn test_failed_writes_leave_wheel_unchanged() -> TestResult {
    let failing = Arc::new(Mutex::new(None));
    let backend = FailingWrites {
        inner: MemoryBackend::new(),
        failing: failing.clone(),
    };
    let clock = Arc::new(ManualClock::starting_at(1_000));
    let mut wheel = assert_ok!(SpinWheel::new(
        test_config(),
        StateStore::new(Box::new(backend)),
        clock.clone()
    ));
    let records = vec![json!("Ana (1001)"), json!("Bruno (1002)"), json!("Carla (1003)")];
    assert_ok!(wheel.load_entry_sets(vec![entry_set(1, "guests", records, clock.as_ref())]));

    *assert_ok!(failing.lock()) = Some(KEY_REMOVED);
    assert_test!(matches!(
        assert_err!(wheel.remove_entry(Some("1001"), "Ana")),
        WheelError::State(_)
    ));
    assert_eq_test!(wheel.pool().len(), 3, "entry stays when the removal is not saved");
    assert_eq_test!(wheel.pool().index_of_ticket("1001"), Some(0));
    assert_test!(wheel.ledger().removed().is_empty());

    *assert_ok!(failing.lock()) = Some(KEY_WINNERS);
    assert_ok!(wheel.spin());
    let mut failed = false;
    for _ in 0..1_000 {
        clock.advance(16);
        match wheel.frame() {
            Ok(None) => {}
            Ok(Some(result)) => return fail!("spin #{} recorded without saving", result.spin_number),
            Err(_) => {
                failed = true;
                break;
            }
        }
    }
    assert_test!(failed, "completion surfaces the write error");
    assert_test!(wheel.results().is_empty());
    assert_test!(wheel.last_result().is_none());
    assert_test!(
        !wheel
            .flags()
            .intersects(WheelFlags::SPINNING | WheelFlags::RESULT_SHOWN | WheelFlags::FROZEN),
        "flags: {:?}",
        wheel.flags()
    );

    *assert_ok!(failing.lock()) = None;
    assert_ok!(wheel.spin());
    let Some(result) = run_spin(&mut wheel, clock.as_ref()) else {
        return fail!("spin never completed");
    };
    assert_eq_test!(wheel.results().len(), 1);
    assert_test!(assert_ok!(wheel.remove_winner()).is_removed());
    assert_eq_test!(wheel.pool().len(), 2);
    assert_eq_test!(wheel.pool().position_of(&result.winning_entry), None);
    assert_eq_test!(assert_ok!(wheel.state().removed_entries()).len(), 1);
    pass!()
}

pub fn test_pinned_ticket_fixes_first_spin() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    let mut set = entry_set(1, "vip", ticketed_records("Vip", 10, 500), clock.as_ref());
    set.pinned_ticket = Some(" 507 ".into());
    assert_ok!(wheel.load_entry_sets(vec![set]));

    assert_eq_test!(assert_ok!(wheel.state().mode_for_spin(1, SpinMode::Random)), SpinMode::Fixed);
    assert_eq_test!(wheel.pending_winner(), Some(7));

    assert_ok!(wheel.spin());
    let Some(result) = run_spin(&mut wheel, clock.as_ref()) else {
        return fail!("spin never completed");
    };
    assert_eq_test!(result.winning_entry.identity_ticket(), Some("507"));
    assert_ok!(wheel.dismiss());
    assert_eq_test!(wheel.pending_winner(), None, "spin 2 is random");
    pass!()
}

pub fn test_sequential_rotation_advances() -> TestResult {
    let config = WheelConfig {
        rotation: RotationPolicy::Sequential,
        ..test_config()
    };
    let Some((mut wheel, clock)) = new_wheel(config) else {
        return fail!("wheel construction failed");
    };
    let first = entry_set(1, "morning", vec![json!("Ana"), json!("Bruno")], clock.as_ref());
    let second = entry_set(2, "evening", vec![json!("Carla"), json!("Davi"), json!("Eva")], clock.as_ref());
    let mut inactive = entry_set(3, "archive", vec![json!("Zed")], clock.as_ref());
    inactive.active = false;

    assert_eq_test!(assert_ok!(wheel.load_entry_sets(vec![first, second, inactive])), 2);
    assert_eq_test!(wheel.current_set_name(), Some("morning"));

    for expected in ["evening", "morning"] {
        assert_ok!(wheel.spin());
        if run_spin(&mut wheel, clock.as_ref()).is_none() {
            return fail!("spin never completed");
        }
        assert_ok!(wheel.dismiss());
        assert_eq_test!(wheel.current_set_name(), Some(expected));
    }
    pass!()
}

pub fn test_merged_rotation_concatenates() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    let first = entry_set(1, "a", vec![json!("Ana"), json!("Bruno")], clock.as_ref());
    let mut second = entry_set(2, "b", vec![json!("Carla")], clock.as_ref());
    second.center_image = Some("data:image/png;base64,AAAA".into());
    assert_eq_test!(assert_ok!(wheel.load_entry_sets(vec![first, second])), 3);
    assert_eq_test!(wheel.current_set_name(), None);
    let names: Vec<&str> = wheel.pool().entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq_test!(names, vec!["Ana", "Bruno", "Carla"]);
    assert_test!(wheel.view().center_image.is_some());

    assert_ok!(wheel.load_entry_sets(Vec::new()));
    assert_eq_test!(wheel.pool().len(), 8, "no sets falls back to placeholders");
    pass!()
}

pub fn test_reset_all_restarts_counter() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    assert_ok!(wheel.spin());
    if run_spin(&mut wheel, clock.as_ref()).is_none() {
        return fail!("spin never completed");
    }
    assert_ok!(wheel.remove_winner());
    assert_eq_test!(wheel.pool().len(), 7);

    assert_ok!(wheel.reset_all());
    assert_eq_test!(assert_ok!(wheel.spin_count()), 0);
    assert_test!(wheel.results().is_empty());
    assert_test!(wheel.last_result().is_none());
    assert_test!(wheel.ledger().removed().is_empty());
    assert_eq_test!(wheel.pool().len(), 8);
    assert_eq_test!(assert_ok!(wheel.spin()).spin_number, 1);
    pass!()
}

pub fn test_idle_drift_only_when_idle() -> TestResult {
    let Some((mut wheel, clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    clock.advance(500);
    assert_ok!(wheel.frame());
    assert_close!(wheel.rotation(), 3.0, 1e-9, "0.3 degrees per 50 ms");

    assert_ok!(wheel.spin());
    if run_spin(&mut wheel, clock.as_ref()).is_none() {
        return fail!("spin never completed");
    }
    let landed = wheel.rotation();
    clock.advance(500);
    assert_ok!(wheel.frame());
    assert_close!(wheel.rotation(), landed, 1e-12, "no drift while a result is shown");

    assert_test!(WheelFlags::FIXED_PENDING.is_idle());
    assert_test!(!WheelFlags::FROZEN.is_idle(), "a frozen wheel does not drift");
    assert_test!(!WheelFlags::FROZEN.may_resample());
    assert_test!(!(WheelFlags::RESULT_SHOWN | WheelFlags::FROZEN).is_idle());
    pass!()
}

pub fn test_view_colors() -> TestResult {
    let Some((wheel, _clock)) = new_wheel(test_config()) else {
        return fail!("wheel construction failed");
    };
    let view = wheel.view();
    assert_eq_test!(view.visible_batch.len(), 8);
    assert_eq_test!(view.colors.len(), 8);
    assert_eq_test!(view.colors[4], slice_color(0));
    assert_eq_test!(slice_color(0).text, Color32::BLACK);
    assert_eq_test!(slice_color(3).text, Color32::WHITE);
    assert_eq_test!(view.pointer_color, PALETTE[2], "slice 2 starts at the pointer on an 8-wheel");
    assert_eq_test!(pointer_color(0.0, 8, false), Color32::GOLD);
    assert_eq_test!(pointer_color(0.0, 0, true), Color32::GOLD);
    pass!()
}

define_test_suite!(
    core_wheel,
    [
        test_fixed_spin_on_placeholders,
        test_spin_gates,
        test_random_result_matches_final_angle,
        test_large_pool_batch_frozen_during_spin,
        test_remove_winner_takes_one_duplicate,
        test_failed_writes_leave_wheel_unchanged,
        test_pinned_ticket_fixes_first_spin,
        test_sequential_rotation_advances,
        test_merged_rotation_concatenates,
        test_reset_all_restarts_counter,
        test_idle_drift_only_when_idle,
        test_view_colors,
    ]
);
