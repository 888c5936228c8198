use std::sync::Arc;

use spinwheel_abi::{DesignatedWinner, IngestError, NewEntrySet, SpinMode, SpinResult, Theme};
use spinwheel_core::{RemovalOutcome, SpinWheel, StateStore};
use spinwheel_drivers::parse_upload;
use spinwheel_fs::{RamStore, SpinFileStore};
use spinwheel_lib::testing::TestResult;
use spinwheel_lib::{
    ManualClock, RotationPolicy, WheelConfig, WheelRng, assert_eq_test, assert_err, assert_ok,
    assert_test, define_test_suite, fail, pass,
};
use spinwheel_video::{Canvas, TextOptions, WheelLayout, WheelRenderer, render_text};

fn config() -> WheelConfig {
    WheelConfig {
        spin_duration_ms: 900,
        seed: Some(23),
        ..WheelConfig::default()
    }
}

fn guests_csv(count: usize) -> String {
    let mut csv = String::from("First Name;Last Name;Ticket Number\n");
    for i in 0..count {
        csv.push_str(&format!("Guest;No{};{}\n", i, 1000 + i));
    }
    csv
}

fn store_with(clock: &Arc<ManualClock>, uploads: &[(&str, &[u8])]) -> Option<RamStore> {
    let store = RamStore::with_clock(clock.clone(), WheelRng::with_seed(2));
    for (name, bytes) in uploads {
        let entries = parse_upload(name, bytes).ok()?;
        store
            .create(NewEntrySet {
                filename: name.to_string(),
                entries,
                ..NewEntrySet::default()
            })
            .ok()?;
    }
    Some(store)
}

fn finish(wheel: &mut SpinWheel, clock: &ManualClock) -> Option<SpinResult> {
    for _ in 0..500 {
        clock.advance(16);
        match wheel.frame() {
            Ok(Some(result)) => return Some(result),
            Ok(None) => {}
            Err(_) => return None,
        }
    }
    None
}

pub fn test_csv_to_fixed_winner_on_screen() -> TestResult {
    let clock = Arc::new(ManualClock::starting_at(0));
    let csv = guests_csv(150);
    let Some(store) = store_with(&clock, &[("guests.csv", csv.as_bytes())]) else {
        return fail!("upload failed");
    };

    let mut wheel = assert_ok!(SpinWheel::new(config(), StateStore::in_memory(), clock.clone()));
    assert_eq_test!(assert_ok!(wheel.load_entry_sets(assert_ok!(store.list(true)))), 150);

    assert_ok!(wheel.set_spin_mode(1, SpinMode::Fixed));
    assert_test!(assert_ok!(wheel.designate_winner(1, DesignatedWinner::by_ticket("1137"))));
    let started = assert_ok!(wheel.spin());
    assert_eq_test!(started.mode, SpinMode::Fixed);
    assert_eq_test!(started.batch_len, 100);

    let Some(result) = finish(&mut wheel, &clock) else {
        return fail!("spin never completed");
    };
    assert_eq_test!(result.winning_entry.label(), "Guest No137 (1137)".to_string());
    assert_eq_test!(result.slice_index, 0, "sampled batches carry the winner in slot 0");

    let view = wheel.view();
    assert_eq_test!(view.pointer_color, view.colors[result.slice_index].fill);
    let mut canvas = Canvas::new(240, 240);
    let renderer = WheelRenderer::new(WheelLayout::fit(240, 240), Theme::Night);
    renderer.render(&view, &mut canvas);
    let l = *renderer.layout();
    assert_eq_test!(canvas.pixel(l.cx + l.radius, l.cy), Some(view.pointer_color));

    let text = render_text(&view, &TextOptions::default());
    assert_test!(text.contains("> [  0] Guest No137 (1137)"), "text: {}", text);

    match assert_ok!(wheel.remove_winner()) {
        RemovalOutcome::Removed { entry, .. } => {
            assert_eq_test!(entry.identity_ticket(), Some("1137"))
        }
        RemovalOutcome::Refused(reason) => return fail!("refused: {}", reason),
    }
    assert_eq_test!(wheel.pool().len(), 149);
    assert_test!(wheel.pool().index_of_ticket("1137").is_none());
    pass!()
}

pub fn test_merged_and_sequential_sets() -> TestResult {
    let clock = Arc::new(ManualClock::starting_at(0));
    let json = br#"{"data": [{"First Name": "Ana", "Ticket": 1}, {"First Name": "Bia", "Ticket": 2}]}"#;
    let csv = b"First Name,Ticket\nCaio,3\nDani,4\nEli,5\n";
    let Some(store) = store_with(&clock, &[("vip.json", &json[..]), ("general.csv", &csv[..])]) else {
        return fail!("upload failed");
    };

    let mut merged = assert_ok!(SpinWheel::new(config(), StateStore::in_memory(), clock.clone()));
    assert_eq_test!(assert_ok!(merged.load_entry_sets(assert_ok!(store.list(true)))), 5);
    assert_eq_test!(merged.current_set_name(), None);

    let sequential_config = WheelConfig {
        rotation: RotationPolicy::Sequential,
        ..config()
    };
    let mut sequential = assert_ok!(SpinWheel::new(sequential_config, StateStore::in_memory(), clock.clone()));
    assert_eq_test!(assert_ok!(sequential.load_entry_sets(assert_ok!(store.list(true)))), 3);
    assert_eq_test!(sequential.current_set_name(), Some("general.csv"));

    assert_ok!(sequential.spin());
    if finish(&mut sequential, &clock).is_none() {
        return fail!("spin never completed");
    }
    assert_ok!(sequential.dismiss());
    assert_eq_test!(sequential.current_set_name(), Some("vip.json"));
    assert_eq_test!(sequential.pool().len(), 2);
    pass!()
}

pub fn test_unsupported_upload_is_rejected() -> TestResult {
    let err = assert_err!(parse_upload("guests.pdf", b"%PDF-1.7"));
    assert_test!(matches!(err, IngestError::UnsupportedFormat(ref ext) if ext == "pdf"));
    let err = assert_err!(parse_upload("guests.xlsx", b"PK\x03\x04"));
    assert_test!(matches!(err, IngestError::Workbook(_)));
    let err = assert_err!(parse_upload("empty.csv", b"\xEF\xBB\xBF  \n"));
    assert_test!(matches!(err, IngestError::Empty));
    pass!()
}

define_test_suite!(
    pipeline,
    [
        test_csv_to_fixed_winner_on_screen,
        test_merged_and_sequential_sets,
        test_unsupported_upload_is_rejected,
    ]
);
