/*
 * Geometry Module
 *
 * Angle helpers the steering rules are built on; vectors are glam's
 * `DVec2`. Headings are in degrees and live in (-180, 180].
 *
 * The heading/vector conversions are deliberately not the textbook atan2
 * pair: `heading_to_vector` yields a non-unit vector with x fixed to +-1,
 * and `angle_of` mirrors left-pointing vectors into the forward half plane.
 * Steering behaviour depends on both quirks, so they are kept exactly.
 */

use glam::{dvec2, DVec2};

/// Fold an angle in degrees into (-180, 180].
///
/// Values already in range are returned untouched, which makes the function
/// exactly idempotent. Non-finite input is returned as is.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }

    // Bring huge values close first so the loops below stay short
    let mut angle = if angle.abs() > 3600.0 {
        angle % 360.0
    } else {
        angle
    };

    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Heading in degrees that a vector points along.
///
/// Axis-aligned vectors are special-cased and the zero vector reads as 0.
/// For `x < 0` the arctangent is negated, which mirrors the vector across
/// the y axis.
pub fn angle_of(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        if y > 0.0 {
            90.0
        } else if y < 0.0 {
            -90.0
        } else {
            0.0
        }
    } else if y == 0.0 {
        if x > 0.0 {
            0.0
        } else {
            180.0
        }
    } else {
        let degrees = (y / x).atan().to_degrees();
        if x < 0.0 {
            -degrees
        } else {
            degrees
        }
    }
}

/// Direction vector for a heading in degrees.
///
/// Not unit length: x is pinned to +-1 and y carries the tangent, except at
/// straight up/down where the tangent blows up.
pub fn heading_to_vector(heading: f64) -> DVec2 {
    if heading == 90.0 {
        dvec2(0.0, 1.0)
    } else if heading == 270.0 || heading == -90.0 {
        dvec2(0.0, -1.0)
    } else if heading.abs() > 90.0 {
        // facing backward
        dvec2(-1.0, -heading.to_radians().tan())
    } else {
        dvec2(1.0, heading.to_radians().tan())
    }
}

// Signed turn of at most `max_turn` degrees, with the sign of `difference`
#[inline]
pub fn clamp_turn(difference: f64, max_turn: f64) -> f64 {
    if difference == 0.0 {
        return 0.0;
    }
    difference.abs().min(max_turn) * difference.signum()
}

/// Turn (in degrees) that rotates `heading` towards `target`, limited to `max_turn`.
pub fn turn_towards(heading: f64, target: f64, max_turn: f64) -> f64 {
    clamp_turn(normalize_angle(target - heading), max_turn)
}

/// Turn (in degrees) that rotates `heading` away from `target`, limited to `max_turn`.
pub fn turn_away(heading: f64, target: f64, max_turn: f64) -> f64 {
    clamp_turn(normalize_angle(heading - target), max_turn)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn same_direction(a: DVec2, b: DVec2) -> bool {
        let a = a.normalize_or_zero();
        let b = b.normalize_or_zero();
        (a - b).length() < 1e-9
    }

    #[test]
    fn normalize_folds_into_half_open_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-180.0), 180.0);
        assert_eq!(normalize_angle(190.0), -170.0);
        assert_eq!(normalize_angle(-190.0), 170.0);
        assert_eq!(normalize_angle(540.0), 180.0);
        assert_eq!(normalize_angle(-540.0), 180.0);
        assert_eq!(normalize_angle(721.0), 1.0);

        let big = normalize_angle(1.0e7 + 0.25);
        assert!(big > -180.0 && big <= 180.0);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut x = -5000.0;
        while x < 5000.0 {
            let once = normalize_angle(x);
            assert!(once > -180.0 && once <= 180.0, "{x} -> {once}");
            assert_eq!(normalize_angle(once), once);
            x += 7.3;
        }
        for x in [-0.1, 179.999_999, -179.999_999, 1e-300, -1e-300] {
            assert_eq!(normalize_angle(normalize_angle(x)), normalize_angle(x));
        }
    }

    #[test]
    fn angle_of_special_cases() {
        assert_eq!(angle_of(0.0, 2.0), 90.0);
        assert_eq!(angle_of(0.0, -2.0), -90.0);
        assert_eq!(angle_of(0.0, 0.0), 0.0);
        assert_eq!(angle_of(3.0, 0.0), 0.0);
        assert_eq!(angle_of(-3.0, 0.0), 180.0);
        assert!((angle_of(1.0, 1.0) - 45.0).abs() < EPS);
        assert!((angle_of(1.0, -1.0) + 45.0).abs() < EPS);
    }

    #[test]
    fn angle_of_mirrors_left_pointing_vectors() {
        // (-1, 1) reads as the mirrored (1, 1)
        assert!((angle_of(-1.0, 1.0) - 45.0).abs() < EPS);
        assert!((angle_of(-1.0, -1.0) + 45.0).abs() < EPS);
        assert!((angle_of(-2.0, 1.0) - angle_of(2.0, 1.0)).abs() < EPS);
    }

    #[test]
    fn heading_to_vector_cardinals() {
        assert_eq!(heading_to_vector(90.0), dvec2(0.0, 1.0));
        assert_eq!(heading_to_vector(-90.0), dvec2(0.0, -1.0));
        assert_eq!(heading_to_vector(270.0), dvec2(0.0, -1.0));
        assert_eq!(heading_to_vector(0.0), dvec2(1.0, 0.0));

        let back = heading_to_vector(180.0);
        assert_eq!(back.x, -1.0);
        assert!(back.y.abs() < EPS);
    }

    #[test]
    fn heading_to_vector_points_along_heading() {
        let mut heading: f64 = -179.5;
        while heading <= 180.0 {
            let expected = dvec2(heading.to_radians().cos(), heading.to_radians().sin());
            assert!(
                same_direction(heading_to_vector(heading), expected),
                "heading {heading}"
            );
            heading += 0.5;
        }
    }

    #[test]
    fn angle_round_trips_for_forward_and_axis_vectors() {
        let samples = [
            (1.0, 0.5),
            (3.0, -2.0),
            (0.2, 7.0),
            (5.0, -0.01),
            (0.0, 4.0),
            (0.0, -4.0),
            (2.0, 0.0),
            (-2.0, 0.0),
        ];
        for (x, y) in samples {
            let round_trip = heading_to_vector(angle_of(x, y));
            assert!(same_direction(round_trip, dvec2(x, y)), "({x}, {y})");
        }
    }

    #[test]
    fn turns_are_clamped_and_signed() {
        assert_eq!(turn_towards(0.0, 10.0, 3.0), 3.0);
        assert_eq!(turn_towards(0.0, -10.0, 3.0), -3.0);
        assert_eq!(turn_towards(0.0, 2.0, 3.0), 2.0);
        assert_eq!(turn_towards(5.0, 5.0, 3.0), 0.0);

        // shortest way round: 170 -> -170 is +20, not -340
        assert!((turn_towards(170.0, -170.0, 50.0) - 20.0).abs() < EPS);

        // away flips the sign
        assert_eq!(turn_away(0.0, 10.0, 1.5), -1.5);
        assert_eq!(turn_away(0.0, -10.0, 1.5), 1.5);
        assert_eq!(turn_away(180.0, 0.0, 1.5), 1.5);
    }
}
