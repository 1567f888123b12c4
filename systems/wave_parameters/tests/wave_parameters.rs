use skyfall_core::{Level, PlatformProfile, MAX_LEVEL};
use skyfall_system_wave_parameters::{compute_parameters, WaveParameterCalculator, WaveTuning};

fn profiles() -> [PlatformProfile; 2] {
    [PlatformProfile::desktop(), PlatformProfile::mobile(390.0)]
}

fn levels() -> impl Iterator<Item = Level> {
    (1..=60).map(Level::new)
}

#[test]
fn level_one_desktop_matches_baseline() {
    let parameters = compute_parameters(Level::new(1), &PlatformProfile::desktop());
    assert_eq!(parameters.enemy_count(), 25);
    assert!((parameters.enemy_speed() - 100.0).abs() < f32::EPSILON);
    assert_eq!(parameters.max_bullets(), 32);
    assert_eq!(parameters.required_kills(), 22);
}

#[test]
fn level_five_desktop_matches_baseline() {
    let parameters = compute_parameters(Level::new(5), &PlatformProfile::desktop());
    assert_eq!(parameters.enemy_count(), 45);
    assert!((parameters.enemy_speed() - 180.0).abs() < f32::EPSILON);
    assert_eq!(parameters.max_bullets(), 60);
    assert_eq!(parameters.required_kills(), 40);
}

#[test]
fn mobile_profile_applies_modifiers() {
    let parameters = compute_parameters(Level::new(1), &PlatformProfile::mobile(400.0));
    assert_eq!(parameters.enemy_count(), 25);
    assert!((parameters.enemy_speed() - 70.0).abs() < 1e-3);
    // floor(25 * 1.30 * 1.1) = floor(35.75)
    assert_eq!(parameters.max_bullets(), 35);
    assert_eq!(parameters.required_kills(), 20);
}

#[test]
fn desktop_band_ignores_viewport_width() {
    let wide = PlatformProfile {
        is_mobile: false,
        viewport_width: 1280.0,
    };
    assert_eq!(
        compute_parameters(Level::FIRST, &wide).spawn_band(),
        compute_parameters(Level::FIRST, &PlatformProfile::desktop()).spawn_band()
    );

    let mut tuning = WaveTuning::default();
    tuning.spawn_area.desktop_center = 640.0;
    let band = WaveParameterCalculator::new(tuning)
        .compute(Level::FIRST, &wide)
        .spawn_band();
    assert!((band.left() - 450.0).abs() < 1e-3);
    assert!((band.right() - 830.0).abs() < 1e-3);
}

#[test]
fn desktop_band_is_fixed_and_centred() {
    let first = compute_parameters(Level::new(1), &PlatformProfile::desktop());
    let last = compute_parameters(MAX_LEVEL, &PlatformProfile::desktop());
    assert_eq!(first.spawn_band(), last.spawn_band());
    assert!((first.spawn_band().left() - 210.0).abs() < 1e-3);
    assert!((first.spawn_band().right() - 590.0).abs() < 1e-3);
    assert!((first.spawn_area_width() - 380.0).abs() < 1e-3);
}

#[test]
fn mobile_band_spans_middle_half_of_viewport() {
    let parameters = compute_parameters(Level::new(3), &PlatformProfile::mobile(400.0));
    assert!((parameters.spawn_band().left() - 100.0).abs() < 1e-3);
    assert!((parameters.spawn_band().right() - 300.0).abs() < 1e-3);
}

#[test]
fn required_kills_never_exceed_enemy_count() {
    for profile in profiles() {
        for level in levels() {
            let parameters = compute_parameters(level, &profile);
            assert!(
                parameters.required_kills() <= parameters.enemy_count(),
                "level {level} requires more kills than enemies"
            );
        }
    }
}

#[test]
fn bullet_budget_covers_every_enemy() {
    for profile in profiles() {
        for level in levels() {
            let parameters = compute_parameters(level, &profile);
            assert!(
                parameters.max_bullets() >= parameters.enemy_count(),
                "level {level} budget below enemy count"
            );
        }
    }
}

#[test]
fn difficulty_is_monotonic_in_level() {
    for profile in profiles() {
        let mut previous = compute_parameters(Level::FIRST, &profile);
        for level in levels().skip(1) {
            let current = compute_parameters(level, &profile);
            assert!(current.enemy_count() >= previous.enemy_count());
            assert!(current.enemy_speed() >= previous.enemy_speed());
            assert!(current.required_kills() >= previous.required_kills());
            previous = current;
        }
    }
}

#[test]
fn computation_is_idempotent() {
    let calculator = WaveParameterCalculator::default();
    for profile in profiles() {
        for level in levels() {
            assert_eq!(
                calculator.compute(level, &profile),
                calculator.compute(level, &profile)
            );
        }
    }
}
