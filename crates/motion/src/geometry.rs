use base::Vec2;

/// Angle at `vertex` from the ray towards `a` to the ray towards `b`, in degrees,
/// normalized into `[0, 360)`.
pub fn angle_degrees(a: Vec2<f64>, vertex: Vec2<f64>, b: Vec2<f64>) -> f64 {
    let radians = (b - vertex).angle() - (a - vertex).angle();
    (radians.to_degrees() + 360.0) % 360.0
}

/// Euclidean distance in pixels.
pub fn distance(from: Vec2<f64>, to: Vec2<f64>) -> f64 {
    from.distance_to(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2<f64> {
        Vec2::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        // image y grows downwards, so a quarter turn from +x to +y is 90
        assert!((angle_degrees(v(1.0, 0.0), v(0.0, 0.0), v(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((angle_degrees(v(0.0, 1.0), v(0.0, 0.0), v(1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_straight_and_zero() {
        assert!((angle_degrees(v(-1.0, 0.0), v(0.0, 0.0), v(1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert_eq!(angle_degrees(v(2.0, 0.0), v(0.0, 0.0), v(5.0, 0.0)), 0.0);
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(v(0.0, 0.0), v(3.0, 4.0)), 5.0);
    }
}
