/// A point in canvas space. Coordinates are center-origin: (0, 0) is the
/// middle of the canvas, y grows downward as in SVG.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance from the canvas origin.
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Convert a layout angle (degrees) and radius into canvas coordinates,
/// applying the style rotation offset.
pub fn polar_point(angle_deg: f64, radius: f64, rotation_deg: f64) -> Point {
    let theta = (angle_deg + rotation_deg).to_radians();
    Point::new(radius * theta.cos(), radius * theta.sin())
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_point_axes() {
        let p = polar_point(0.0, 10.0, 0.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);

        let p = polar_point(90.0, 10.0, 0.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_point_rotation_offset() {
        // A 90 degree rotation maps the 0-degree ray onto the +y axis.
        let plain = polar_point(90.0, 5.0, 0.0);
        let rotated = polar_point(0.0, 5.0, 90.0);
        assert!(plain.distance(rotated) < 1e-9);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 8.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 8.0, 1.0), 8.0);
        assert_eq!(lerp(2.0, 8.0, 0.5), 5.0);
    }
}
