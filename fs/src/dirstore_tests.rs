use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::json;
use spinwheel_abi::{NewEntrySet, SpinMode, StoreError};
use spinwheel_core::{PersistBackend, StateStore};
use spinwheel_lib::testing::TestResult;
use spinwheel_lib::{
    ManualClock, WheelRng, assert_eq_test, assert_err, assert_ok, assert_test, define_test_suite,
    fail, pass,
};

use crate::dirstore::{DirStore, FileBackend};
use crate::store::SpinFileStore;

static SCRATCH_SEQ: AtomicU32 = AtomicU32::new(0);

/// Fresh directory under the system temp dir, removed on drop.
struct Scratch(PathBuf);

impl Scratch {
    fn new(tag: &str) -> Self {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "spinwheel-{}-{}-{}",
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

fn open(dir: &Scratch) -> Option<DirStore> {
    DirStore::open_with(
        dir.0.clone(),
        Arc::new(ManualClock::starting_at(0)),
        WheelRng::with_seed(4),
    )
    .ok()
}

pub fn test_sets_survive_reopen() -> TestResult {
    let dir = Scratch::new("reopen");
    let Some(store) = open(&dir) else {
        return fail!("open failed");
    };
    let set = assert_ok!(store.create(NewEntrySet {
        filename: "gala".into(),
        entries: vec![json!("Ana (1)"), json!("Bruno (2)")],
        center_image: Some("data:image/png;base64,AAAA".into()),
        pinned_ticket: Some("2".into()),
    }));
    assert_eq_test!(assert_ok!(store.toggle_active(set.id)), false);
    drop(store);

    let Some(reopened) = open(&dir) else {
        return fail!("reopen failed");
    };
    let loaded = assert_ok!(reopened.get(set.id));
    assert_eq_test!(loaded.filename.as_str(), "gala");
    assert_eq_test!(loaded.entries.len(), 2);
    assert_eq_test!(loaded.pinned_ticket.as_deref(), Some("2"));
    assert_test!(!loaded.active);

    let next = assert_ok!(reopened.create(NewEntrySet {
        filename: "next".into(),
        entries: vec![json!("Carla")],
        ..NewEntrySet::default()
    }));
    assert_test!(next.id > set.id, "ids continue after the highest stored id");
    pass!()
}

pub fn test_delete_removes_file() -> TestResult {
    let dir = Scratch::new("delete");
    let Some(store) = open(&dir) else {
        return fail!("open failed");
    };
    let set = assert_ok!(store.create(NewEntrySet {
        filename: "temp".into(),
        entries: vec![json!("Ana")],
        ..NewEntrySet::default()
    }));
    let path = dir.0.join("sets").join(format!("{}.json", set.id));
    assert_test!(path.exists());
    assert_ok!(store.delete(set.id));
    assert_test!(!path.exists());
    assert_test!(assert_ok!(store.list(false)).is_empty());
    pass!()
}

pub fn test_secret_persists() -> TestResult {
    let dir = Scratch::new("secret");
    let Some(store) = open(&dir) else {
        return fail!("open failed");
    };
    assert_ok!(store.update_secret("admin", "s3cret"));
    drop(store);

    let Some(reopened) = open(&dir) else {
        return fail!("reopen failed");
    };
    assert_test!(assert_ok!(reopened.check_secret("s3cret")));
    assert_test!(!assert_ok!(reopened.check_secret("admin")));

    let raw = assert_ok!(fs::read_to_string(dir.0.join("secret.json")));
    assert_test!(!raw.contains("s3cret"), "secret stored in clear text");
    pass!()
}

pub fn test_unsaved_secret_change_is_undone() -> TestResult {
    let dir = Scratch::new("secret-fail");
    let Some(store) = open(&dir) else {
        return fail!("open failed");
    };
    let path = dir.0.join("secret.json");
    assert_ok!(fs::remove_file(&path));
    assert_ok!(fs::create_dir(&path));

    let err = assert_err!(store.update_secret("admin", "s3cret"));
    assert_test!(matches!(err, StoreError::Io(_)), "got {}", err);
    assert_test!(assert_ok!(store.check_secret("admin")), "old password still works");
    assert_test!(!assert_ok!(store.check_secret("s3cret")));

    assert_ok!(fs::remove_dir(&path));
    assert_ok!(store.update_secret("admin", "s3cret"));
    assert_test!(assert_ok!(store.check_secret("s3cret")));
    pass!()
}

pub fn test_file_backend_round_trip() -> TestResult {
    let dir = Scratch::new("backend");
    let mut backend = assert_ok!(FileBackend::open(dir.0.join("state")));
    assert_eq_test!(assert_ok!(backend.read("spinCount")), None);
    assert_ok!(backend.write("spinCount", "3"));
    assert_eq_test!(assert_ok!(backend.read("spinCount")), Some("3".to_string()));
    assert_ok!(backend.delete("spinCount"));
    assert_ok!(backend.delete("spinCount"));
    assert_eq_test!(assert_ok!(backend.read("spinCount")), None);
    pass!()
}

pub fn test_state_store_over_files() -> TestResult {
    let dir = Scratch::new("state");
    let Some(store) = open(&dir) else {
        return fail!("open failed");
    };
    {
        let mut state = StateStore::new(Box::new(assert_ok!(store.state_backend())));
        assert_ok!(state.set_spin_count(7));
        assert_ok!(state.set_spin_mode(8, SpinMode::Fixed));
    }
    let state = StateStore::new(Box::new(assert_ok!(store.state_backend())));
    assert_eq_test!(assert_ok!(state.spin_count()), 7);
    assert_eq_test!(assert_ok!(state.mode_for_spin(8, SpinMode::Random)), SpinMode::Fixed);
    assert_test!(dir.0.join("state").join("spinCount.json").exists());
    pass!()
}

define_test_suite!(
    fs_dirstore,
    [
        test_sets_survive_reopen,
        test_delete_removes_file,
        test_secret_persists,
        test_unsaved_secret_change_is_undone,
        test_file_backend_round_trip,
        test_state_store_over_files,
    ]
);
