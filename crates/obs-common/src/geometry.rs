//! Minimal geometry model for feature and observation locations.

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// A position with optional height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }
}

/// Geometry attached to features and (for mobile platforms) observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    Polygon(Vec<Point>),
}

impl Geometry {
    /// Bounding envelope of the geometry, `None` for empty coordinate lists.
    pub fn envelope(&self) -> Option<Envelope> {
        match self {
            Geometry::Point(p) => Some(Envelope::of_point(p.x, p.y)),
            Geometry::LineString(points) | Geometry::Polygon(points) => {
                let mut iter = points.iter();
                let first = iter.next()?;
                Some(iter.fold(Envelope::of_point(first.x, first.y), |env, p| {
                    env.union(&Envelope::of_point(p.x, p.y))
                }))
            }
        }
    }

    /// Exact intersection test against an envelope, boundaries inclusive.
    ///
    /// A line hits when a vertex lies inside the envelope or a segment
    /// crosses one of its edges. A polygon additionally hits when the
    /// envelope lies entirely inside the ring.
    pub fn intersects(&self, envelope: &Envelope) -> bool {
        match self.envelope() {
            Some(own) if own.intersects(envelope) => {}
            _ => return false,
        }

        match self {
            Geometry::Point(p) => envelope.contains_point(p.x, p.y),
            Geometry::LineString(points) => path_intersects(points, envelope),
            Geometry::Polygon(ring) => {
                let mut closed = ring.clone();
                if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
                    if first != last {
                        closed.push(*first);
                    }
                }
                path_intersects(&closed, envelope)
                    || ring_contains(ring, envelope.min_x, envelope.min_y)
            }
        }
    }
}

fn path_intersects(points: &[Point], envelope: &Envelope) -> bool {
    if points.iter().any(|p| envelope.contains_point(p.x, p.y)) {
        return true;
    }

    let corners = [
        Point::new(envelope.min_x, envelope.min_y),
        Point::new(envelope.max_x, envelope.min_y),
        Point::new(envelope.max_x, envelope.max_y),
        Point::new(envelope.min_x, envelope.max_y),
    ];
    points.windows(2).any(|segment| {
        (0..4).any(|i| segments_intersect(segment[0], segment[1], corners[i], corners[(i + 1) % 4]))
    })
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Even-odd ray casting.
fn ring_contains(ring: &[Point], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + n - 1) % n];
        if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
    }
    inside
}
