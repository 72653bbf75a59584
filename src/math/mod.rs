/// Axis-aligned extent of one or more drawables, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Bounds {
    pub fn from_point(p: [f64; 2]) -> Self {
        Self { min: p, max: p }
    }

    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: [self.min[0].min(other.min[0]), self.min[1].min(other.min[1])],
            max: [self.max[0].max(other.max[0]), self.max[1].max(other.max[1])],
        }
    }

    pub fn contains(&self, p: [f64; 2], tolerance: f64) -> bool {
        p[0] >= self.min[0] - tolerance
            && p[0] <= self.max[0] + tolerance
            && p[1] >= self.min[1] - tolerance
            && p[1] <= self.max[1] + tolerance
    }
}

pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

pub fn point_to_line_distance(point: [f64; 2], line_start: [f64; 2], line_end: [f64; 2]) -> f64 {
    let line_length_squared =
        (line_end[0] - line_start[0]).powi(2) + (line_end[1] - line_start[1]).powi(2);

    if line_length_squared == 0.0 {
        return distance(point, line_start);
    }

    let t = ((point[0] - line_start[0]) * (line_end[0] - line_start[0])
        + (point[1] - line_start[1]) * (line_end[1] - line_start[1]))
        / line_length_squared;
    let t = t.clamp(0.0, 1.0);

    let projection = [
        line_start[0] + t * (line_end[0] - line_start[0]),
        line_start[1] + t * (line_end[1] - line_start[1]),
    ];

    distance(point, projection)
}

/// The two outer points of an arrowhead drawn at `end`, each `length` away from
/// the tip and rotated `angle` radians either side of the reversed direction.
pub fn arrowhead_points(start: [f64; 2], end: [f64; 2], length: f64, angle: f64) -> [[f64; 2]; 2] {
    let direction = (end[1] - start[1]).atan2(end[0] - start[0]);
    [
        [
            end[0] - length * (direction - angle).cos(),
            end[1] - length * (direction - angle).sin(),
        ],
        [
            end[0] - length * (direction + angle).cos(),
            end[1] - length * (direction + angle).sin(),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn test_point_to_line_distance() {
        let d = point_to_line_distance([5.0, 3.0], [0.0, 0.0], [10.0, 0.0]);
        assert!((d - 3.0).abs() < 0.001);

        // Past the end of the segment the distance is to the endpoint
        let d = point_to_line_distance([13.0, 4.0], [0.0, 0.0], [10.0, 0.0]);
        assert!((d - 5.0).abs() < 0.001);

        let d = point_to_line_distance([3.0, 4.0], [0.0, 0.0], [0.0, 0.0]);
        assert!((d - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_arrowhead_is_symmetric() {
        let [a, b] = arrowhead_points([0.0, 0.0], [10.0, 0.0], 10.0, PI / 6.0);

        assert!((a[0] - b[0]).abs() < 0.001);
        assert!((a[1] + b[1]).abs() < 0.001);
        assert!(a[0] < 10.0);
        assert!((distance(a, [10.0, 0.0]) - 10.0).abs() < 0.001);
        assert!(((a[1].abs()) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_bounds_union() {
        let b = Bounds::from_corners([10.0, 20.0], [0.0, 5.0]).union(Bounds::from_point([-3.0, 40.0]));
        assert_eq!(b.min, [-3.0, 5.0]);
        assert_eq!(b.max, [10.0, 40.0]);
        assert!(b.contains([0.0, 10.0], 0.0));
        assert!(!b.contains([11.0, 10.0], 0.5));
    }
}
