//! Integration tests for the normal deviation strategy

use ki_input_emulator::input::{
    Deviation, DeviationStrategy, NormalDeviationStrategy, Parameters, Rectangle,
};
use std::time::Duration;

fn samples(strategy: &mut NormalDeviationStrategy) -> Vec<Duration> {
    (0..32)
        .flat_map(|_| {
            [
                strategy.calculate_key_down_time(),
                strategy.calculate_key_up_time(),
                strategy.calculate_button_down_time(),
                strategy.calculate_button_up_time(),
                strategy.calculate_wheel_reset_time(),
            ]
        })
        .collect()
}

#[test]
fn test_same_seed_same_sequence() {
    let mut a = NormalDeviationStrategy::with_seed(Parameters::human(), 7).unwrap();
    let mut b = NormalDeviationStrategy::with_seed(Parameters::human(), 7).unwrap();
    assert_eq!(samples(&mut a), samples(&mut b));

    let area = Rectangle::new(10, 10, 400, 300);
    for _ in 0..16 {
        assert_eq!(a.calculate_target_in(&area), b.calculate_target_in(&area));
        assert_eq!(a.calculate_speed(), b.calculate_speed());
    }
}

#[test]
fn test_different_seeds_differ() {
    let mut a = NormalDeviationStrategy::with_seed(Parameters::human(), 1).unwrap();
    let mut b = NormalDeviationStrategy::with_seed(Parameters::human(), 2).unwrap();
    assert_ne!(samples(&mut a), samples(&mut b));
}

#[test]
fn test_times_within_three_sigma() {
    let parameters = Parameters::human();
    let mut sut = NormalDeviationStrategy::with_seed(parameters.clone(), 11).unwrap();
    let bound = |d: &Deviation| Duration::from_millis(d.upper_bound() as u64);

    for _ in 0..256 {
        assert!(sut.calculate_key_down_time() <= bound(&parameters.key_down_time));
        assert!(sut.calculate_key_up_time() <= bound(&parameters.key_up_time));
        assert!(sut.calculate_button_down_time() <= bound(&parameters.button_down_time));
        assert!(sut.calculate_button_up_time() <= bound(&parameters.button_up_time));
        assert!(sut.calculate_wheel_reset_time() <= bound(&parameters.wheel_reset_time));
    }
}

#[test]
fn test_times_spread_around_mean() {
    let mut sut = NormalDeviationStrategy::with_seed(Parameters::human(), 3).unwrap();
    let total: u128 = (0..2000)
        .map(|_| sut.calculate_button_down_time().as_millis())
        .sum();
    let mean = total as f64 / 2000.0;
    // 77 ± 14 truncated at zero, so the sample mean stays close
    assert!((70.0..84.0).contains(&mean), "mean was {}", mean);
}

#[test]
fn test_targets_stay_inside_small_areas() {
    let mut sut = NormalDeviationStrategy::with_seed(Parameters::human(), 5).unwrap();
    for area in [
        Rectangle::new(0, 0, 1, 1),
        Rectangle::new(0, 0, 2, 3),
        Rectangle::new(1910, 1070, 10, 10),
    ] {
        for _ in 0..64 {
            assert!(area.encloses(&sut.calculate_target_in(&area)));
        }
    }
}

#[test]
fn test_wheel_steps_follow_direction() {
    let mut sut = NormalDeviationStrategy::with_seed(Parameters::human(), 5).unwrap();
    for remaining in [-100, -7, -1, 1, 7, 100] {
        let steps = sut.calculate_wheel_steps(remaining);
        assert_eq!(steps.signum(), remaining.signum());
        assert!(steps.abs() <= remaining.abs());
    }
}
