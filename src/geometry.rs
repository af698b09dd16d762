use crate::face::Point;

pub struct Geometry;

impl Geometry {
    /// Midpoint of the segment between two landmarks, truncated to pixel
    /// coordinates.
    pub fn midpoint(a: Point, b: Point) -> Point {
        Point {
            x: (a.x + b.x) / 2,
            y: (a.y + b.y) / 2,
        }
    }

    pub fn distance(a: Point, b: Point) -> f32 {
        (((b.x - a.x).pow(2) + (b.y - a.y).pow(2)) as f32).sqrt()
    }

    /// Axis-aligned bounds of a point set as (min_x, min_y, max_x, max_y).
    pub fn bounding_rect(points: &[Point]) -> (i32, i32, i32, i32) {
        points.iter().fold(
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |(min_x, min_y, max_x, max_y), p| {
                (
                    min_x.min(p.x),
                    min_y.min(p.y),
                    max_x.max(p.x),
                    max_y.max(p.y),
                )
            },
        )
    }
}

#[cfg(test)]
mod test {
    use super::Geometry;
    use crate::face::Point;

    #[test]
    fn midpoint_truncates_toward_zero() {
        let mid = Geometry::midpoint(Point { x: 0, y: 0 }, Point { x: 3, y: 5 });
        assert_eq!(mid, Point { x: 1, y: 2 });
    }

    #[test]
    fn distance_matches_pythagoras() {
        let d = Geometry::distance(Point { x: 0, y: 0 }, Point { x: 3, y: 4 });
        assert!((d - 5.).abs() < f32::EPSILON);
    }

    #[test]
    fn bounding_rect_covers_all_points() {
        let points = [
            Point { x: 4, y: -2 },
            Point { x: -1, y: 9 },
            Point { x: 7, y: 3 },
        ];
        assert_eq!(Geometry::bounding_rect(&points), (-1, -2, 7, 9));
    }
}
