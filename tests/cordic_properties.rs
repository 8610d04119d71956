//! CORDIC accuracy and round-trip properties across iteration counts


use rustyrx::cordic::fixed::{angle_to_degrees, degrees_to_angle};
use rustyrx::cordic::{cordic_rotate, cordic_to_polar, Cordic, FixedCordic, HARDWARE_ITERATIONS};
use test_utils::angle_error_deg;

#[test]
fn test_rotation_error_shrinks_with_iterations() {
    for n in 8..=24 {
        let bound = 2.0f64.powi(2 - n as i32);
        for step in 0..72 {
            let theta = step as f64 * 5.0 - 180.0;
            let (x, y) = cordic_rotate(1.0, 0.0, theta, n).unwrap();
            let (ex, ey) = (theta.to_radians().cos(), theta.to_radians().sin());
            assert!(
                (x - ex).abs() < bound && (y - ey).abs() < bound,
                "n = {}, theta = {}: ({}, {}) vs ({}, {})",
                n,
                theta,
                x,
                y,
                ex,
                ey
            );
        }
    }
}

#[test]
fn test_rotate_then_polar_round_trip() {
    let cordic = Cordic::new(20).unwrap();
    let bound_deg = 2.0f64.powi(3 - 20).to_degrees();
    let inputs = [(1.0, 0.0), (0.3, 0.4), (-2.0, 1.0), (0.0, -5.0)];

    for &(x, y) in inputs.iter() {
        let (start_angle, start_mag) = cordic.to_polar(x, y);
        for theta in [0.0, 17.0, 90.0, 135.5, 200.0, -45.0, 359.0, 725.0] {
            let (xr, yr) = cordic.rotate(x, y, theta);
            let (angle, magnitude) = cordic.to_polar(xr, yr);
            let expected = (start_angle + theta).rem_euclid(360.0);
            assert!(
                angle_error_deg(angle, expected) < bound_deg,
                "({}, {}) by {}: angle {} vs {}",
                x,
                y,
                theta,
                angle,
                expected
            );
            assert!((magnitude - start_mag).abs() / start_mag < 1e-4);
            assert!((0.0..360.0).contains(&angle));
        }
    }
}

#[test]
fn test_polar_of_known_vectors() {
    let cases = [
        ((1.0, 1.0), 45.0),
        ((0.0, 1.0), 90.0),
        ((-1.0, 1.0), 135.0),
        ((-1.0, 0.0), 180.0),
        ((0.0, -1.0), 270.0),
        ((1.0, -1.0), 315.0),
    ];
    for &((x, y), expected) in cases.iter() {
        let (angle, magnitude) = cordic_to_polar(x, y, 24).unwrap();
        assert!(angle_error_deg(angle, expected) < 1e-4, "{} vs {}", angle, expected);
        assert!((magnitude - (x * x + y * y as f64).sqrt()).abs() < 1e-6);
    }
}

#[test]
fn test_fixed_engine_tracks_float_engine() {
    let fixed = FixedCordic::new(HARDWARE_ITERATIONS).unwrap();
    let float = Cordic::new(HARDWARE_ITERATIONS).unwrap();

    for deg in (0..360).step_by(15) {
        let angle = degrees_to_angle(deg as f64);
        let (xf, yf) = fixed.rotate(2000, -500, angle);
        let (xr, yr) = float.rotate(2000.0, -500.0, angle_to_degrees(angle));
        assert!((xf as f64 - xr).abs() <= 12.0, "deg {}: {} vs {}", deg, xf, xr);
        assert!((yf as f64 - yr).abs() <= 12.0, "deg {}: {} vs {}", deg, yf, yr);

        let (fixed_angle, fixed_mag) = fixed.to_polar(xf, yf);
        let (float_angle, float_mag) = float.to_polar(xr, yr);
        assert!(angle_error_deg(angle_to_degrees(fixed_angle), float_angle) < 0.2);
        assert!((fixed_mag as f64 - float_mag).abs() / float_mag < 0.01);
    }
}

#[test]
fn test_iteration_count_validated() {
    assert!(cordic_rotate(1.0, 0.0, 0.0, 0).is_err());
    assert!(cordic_to_polar(1.0, 0.0, 31).is_err());
    assert!(FixedCordic::new(31).is_err());
}
