use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use spinwheel_abi::{NewEntrySet, SpinMode};
use spinwheel_core::{RemovalOutcome, SpinWheel, StateStore};
use spinwheel_drivers::parse_upload;
use spinwheel_fs::{DirStore, SpinFileStore};
use spinwheel_lib::testing::TestResult;
use spinwheel_lib::{
    ManualClock, WheelConfig, WheelRng, assert_eq_test, assert_ok, assert_test,
    define_test_suite, fail, pass,
};

static SCRATCH_SEQ: AtomicU32 = AtomicU32::new(0);

struct Scratch(PathBuf);

impl Scratch {
    fn new(tag: &str) -> Self {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "spinwheel-e2e-{}-{}-{}",
            tag,
            std::process::id(),
            seq
        ));
        let _ = fs::remove_dir_all(&path);
        Self(path)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

const ROSTER: &[u8] = b"First Name,Last Name,Ticket\n\
                        Ana,Silva,11\n\
                        Bruno,Costa,12\n\
                        Carla,Dias,13\n\
                        Davi,Lima,14\n\
                        Elisa,Rocha,15\n";

/// Store plus a wheel over its active sets and its state directory.
fn open(dir: &Scratch, clock: &Arc<ManualClock>) -> Option<(DirStore, SpinWheel)> {
    let store = DirStore::open_with(dir.0.clone(), clock.clone(), WheelRng::with_seed(6)).ok()?;
    let state = StateStore::new(Box::new(store.state_backend().ok()?));
    let config = WheelConfig {
        spin_duration_ms: 600,
        seed: Some(31),
        ..WheelConfig::default()
    };
    let mut wheel = SpinWheel::new(config, state, clock.clone()).ok()?;
    wheel.load_entry_sets(store.list(true).ok()?).ok()?;
    Some((store, wheel))
}

fn spin_once(wheel: &mut SpinWheel, clock: &ManualClock) -> bool {
    if wheel.spin().is_err() {
        return false;
    }
    for _ in 0..500 {
        clock.advance(16);
        match wheel.frame() {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(_) => return false,
        }
    }
    false
}

fn seed_roster(dir: &Scratch, clock: &Arc<ManualClock>) -> bool {
    let Ok(store) = DirStore::open_with(dir.0.clone(), clock.clone(), WheelRng::with_seed(6)) else {
        return false;
    };
    let Ok(entries) = parse_upload("roster.csv", ROSTER) else {
        return false;
    };
    store
        .create(NewEntrySet {
            filename: "roster".into(),
            entries,
            ..NewEntrySet::default()
        })
        .is_ok()
}

pub fn test_wheel_state_survives_restart() -> TestResult {
    let dir = Scratch::new("restart");
    let clock = Arc::new(ManualClock::starting_at(0));
    if !seed_roster(&dir, &clock) {
        return fail!("seeding failed");
    }

    {
        let Some((_store, mut wheel)) = open(&dir, &clock) else {
            return fail!("open failed");
        };
        assert_eq_test!(wheel.pool().len(), 5);
        assert_ok!(wheel.set_spin_mode(2, SpinMode::Fixed));
        if !spin_once(&mut wheel, &clock) {
            return fail!("first spin failed");
        }
        match assert_ok!(wheel.remove_winner()) {
            RemovalOutcome::Removed { .. } => {}
            RemovalOutcome::Refused(reason) => return fail!("refused: {}", reason),
        }
    }

    let Some((_store, wheel)) = open(&dir, &clock) else {
        return fail!("reopen failed");
    };
    assert_eq_test!(assert_ok!(wheel.spin_count()), 1);
    assert_eq_test!(assert_ok!(wheel.state().winners()).len(), 1);
    assert_eq_test!(wheel.pool().len(), 4, "removed winner stays off the wheel");
    assert_eq_test!(
        assert_ok!(wheel.state().mode_for_spin(2, SpinMode::Random)),
        SpinMode::Fixed
    );
    pass!()
}

pub fn test_reset_brings_entries_back() -> TestResult {
    let dir = Scratch::new("reset");
    let clock = Arc::new(ManualClock::starting_at(0));
    if !seed_roster(&dir, &clock) {
        return fail!("seeding failed");
    }
    let Some((_store, mut wheel)) = open(&dir, &clock) else {
        return fail!("open failed");
    };
    for _ in 0..2 {
        if !spin_once(&mut wheel, &clock) {
            return fail!("spin failed");
        }
        assert_test!(assert_ok!(wheel.remove_winner()).is_removed());
    }
    assert_eq_test!(wheel.pool().len(), 3);

    assert_ok!(wheel.reset_all());
    assert_eq_test!(wheel.pool().len(), 5);
    drop(wheel);

    let Some((_store, wheel)) = open(&dir, &clock) else {
        return fail!("reopen failed");
    };
    assert_eq_test!(assert_ok!(wheel.spin_count()), 0);
    assert_test!(assert_ok!(wheel.state().winners()).is_empty());
    assert_eq_test!(wheel.pool().len(), 5);
    pass!()
}

pub fn test_inactive_set_leaves_placeholders() -> TestResult {
    let dir = Scratch::new("inactive");
    let clock = Arc::new(ManualClock::starting_at(0));
    if !seed_roster(&dir, &clock) {
        return fail!("seeding failed");
    }
    let Some((store, _wheel)) = open(&dir, &clock) else {
        return fail!("open failed");
    };
    let set = assert_ok!(store.list(true)).remove(0);
    assert_eq_test!(assert_ok!(store.toggle_active(set.id)), false);

    let Some((_store, wheel)) = open(&dir, &clock) else {
        return fail!("reopen failed");
    };
    assert_eq_test!(wheel.pool().len(), 8, "placeholders when no set is active");
    assert_eq_test!(wheel.pool().get(0).map(|e| e.name.as_str()), Some("Ali"));
    pass!()
}

define_test_suite!(
    persistence,
    [
        test_wheel_state_survives_restart,
        test_reset_brings_entries_back,
        test_inactive_set_leaves_placeholders,
    ]
);
