use spinwheel_lib::testing::TestResult;
use spinwheel_lib::{assert_close, assert_eq_test, assert_test, define_test_suite, pass};

use crate::angle::{
    arc_contains, circular_distance, normalize_degrees, pointer_angle, rotation_for_wheel_angle,
    shortest_adjustment, slice_center, slice_end, slice_start,
};
use crate::resolver::slice_at_pointer;

pub fn test_normalize_wraps() -> TestResult {
    assert_close!(normalize_degrees(-90.0), 270.0, 1e-12);
    assert_close!(normalize_degrees(720.0), 0.0, 1e-12);
    assert_close!(normalize_degrees(725.5), 5.5, 1e-12);
    assert_test!(normalize_degrees(-1e-15) < 360.0, "tiny negatives must not map to 360");
    pass!()
}

pub fn test_slice_bounds_quarters() -> TestResult {
    assert_close!(slice_start(0, 4), 270.0, 1e-12);
    assert_close!(slice_end(0, 4), 0.0, 1e-12);
    assert_close!(slice_center(0, 4), 315.0, 1e-12);
    assert_close!(slice_center(1, 4), 45.0, 1e-12);
    assert_close!(slice_center(3, 4), 225.0, 1e-12);
    pass!()
}

pub fn test_pointer_and_rotation_inverse() -> TestResult {
    for step in 0..720 {
        let angle = step as f64 * 0.5;
        let back = pointer_angle(rotation_for_wheel_angle(angle));
        assert_test!(
            circular_distance(back, angle) < 1e-9,
            "angle {} came back as {}",
            angle,
            back
        );
    }
    assert_close!(pointer_angle(0.0), 0.0, 1e-12);
    assert_close!(pointer_angle(360.0), 0.0, 1e-12);
    assert_close!(pointer_angle(90.0), 270.0, 1e-12);
    pass!()
}

pub fn test_shortest_adjustment_range() -> TestResult {
    assert_close!(shortest_adjustment(350.0, 10.0), 20.0, 1e-12);
    assert_close!(shortest_adjustment(10.0, 350.0), -20.0, 1e-12);
    assert_close!(shortest_adjustment(0.0, 180.0), 180.0, 1e-12);
    assert_close!(shortest_adjustment(200.0, 200.0), 0.0, 1e-12);
    assert_close!(circular_distance(359.0, 1.0), 2.0, 1e-12);
    pass!()
}

pub fn test_arc_wraps_through_zero() -> TestResult {
    assert_test!(arc_contains(350.0, 10.0, 355.0));
    assert_test!(arc_contains(350.0, 10.0, 5.0));
    assert_test!(!arc_contains(350.0, 10.0, 20.0));
    assert_test!(!arc_contains(10.0, 20.0, 20.0), "end is exclusive");
    assert_test!(arc_contains(270.0, 270.0, 12.0), "equal bounds cover the circle");
    pass!()
}

pub fn test_every_rotation_hits_one_slice() -> TestResult {
    for count in [1usize, 4, 100] {
        for step in 0..14_400 {
            let rotation = step as f64 * 0.25;
            let index = slice_at_pointer(rotation, count);
            assert_test!(index < count, "index {} out of {}", index, count);
            assert_eq_test!(
                slice_at_pointer(rotation + 360.0, count),
                index,
                "a full turn must not change the winner"
            );
            let hits = (0..count)
                .filter(|i| arc_contains(slice_start(*i, count), slice_end(*i, count), pointer_angle(rotation)))
                .count();
            assert_test!(count == 1 || hits == 1, "{} slices contain rotation {}", hits, rotation);
        }
    }
    pass!()
}

pub fn test_zero_and_full_turn_agree() -> TestResult {
    for count in 1..=100usize {
        assert_eq_test!(slice_at_pointer(0.0, count), slice_at_pointer(360.0, count));
        assert_eq_test!(slice_at_pointer(-360.0, count), slice_at_pointer(0.0, count));
    }
    assert_eq_test!(slice_at_pointer(0.0, 4), 1, "0 deg is the start of slice 1 on a 4-wheel");
    pass!()
}

pub fn test_centers_resolve_to_their_slice() -> TestResult {
    for count in 1..=100usize {
        for index in 0..count {
            let rotation = rotation_for_wheel_angle(slice_center(index, count));
            assert_eq_test!(slice_at_pointer(rotation, count), index);
        }
    }
    pass!()
}

define_test_suite!(
    core_angle,
    [
        test_normalize_wraps,
        test_slice_bounds_quarters,
        test_pointer_and_rotation_inverse,
        test_shortest_adjustment_range,
        test_arc_wraps_through_zero,
        test_every_rotation_hits_one_slice,
        test_zero_and_full_turn_agree,
        test_centers_resolve_to_their_slice,
    ]
);
