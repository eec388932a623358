//! Pairwise links between nearby points.

use crate::point::Point;

/// A line between two points closer than the link distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Index of the first point.
    pub a: usize,
    /// Index of the second point, always greater than `a`.
    pub b: usize,
    /// Distance between the two points.
    pub distance: f64,
}

/// Visit every unordered pair of points strictly closer than `max_distance`.
///
/// Quadratic in the number of points; the point cap keeps this within a
/// frame.
pub fn for_each_link(points: &[Point], max_distance: f64, mut visit: impl FnMut(Link)) {
    for (a, first) in points.iter().enumerate() {
        for (offset, second) in points[a + 1..].iter().enumerate() {
            let distance = first.distance(second);
            if distance < max_distance {
                visit(Link {
                    a,
                    b: a + 1 + offset,
                    distance,
                });
            }
        }
    }
}

/// Collect every link into a vector.
pub fn links(points: &[Point], max_distance: f64) -> Vec<Link> {
    let mut out = Vec::new();
    for_each_link(points, max_distance, |link| out.push(link));
    out
}
