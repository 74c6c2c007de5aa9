//! Spatial envelope used for bounding-box filters.

use serde::{Deserialize, Serialize};

/// An axis-aligned envelope in the feature geometry's coordinate system.
///
/// Coordinates are lon/lat (x/y) in degrees for the usual CRS:84 data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    /// Create a new envelope from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Degenerate envelope covering a single point.
    pub fn of_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Parse a `bbox` request parameter: "minx,miny,maxx,maxy"
    pub fn from_bbox_string(s: &str) -> Result<Self, EnvelopeParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(EnvelopeParseError::InvalidFormat(s.to_string()));
        }

        let parse = |p: &str| -> Result<f64, EnvelopeParseError> {
            p.parse()
                .map_err(|_| EnvelopeParseError::InvalidNumber(p.to_string()))
        };

        let envelope = Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        };

        if envelope.min_x > envelope.max_x || envelope.min_y > envelope.max_y {
            return Err(EnvelopeParseError::InvertedCorners(s.to_string()));
        }

        Ok(envelope)
    }

    /// Check if this envelope intersects another.
    ///
    /// Touching edges count as intersecting so that point geometries on the
    /// border of a requested bbox are not dropped.
    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if a point is contained within this envelope.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest envelope covering both.
    pub fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EnvelopeParseError {
    #[error("Invalid bbox format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),

    #[error("Invalid bbox: lower corner exceeds upper corner in {0}")]
    InvertedCorners(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let env = Envelope::from_bbox_string("7.0,51.0,8.0,52.5").unwrap();
        assert_eq!(env.min_x, 7.0);
        assert_eq!(env.min_y, 51.0);
        assert_eq!(env.max_x, 8.0);
        assert_eq!(env.max_y, 52.5);
    }

    #[test]
    fn test_parse_bbox_rejects_inverted() {
        let result = Envelope::from_bbox_string("10,10,5,5");
        assert!(matches!(result, Err(EnvelopeParseError::InvertedCorners(_))));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = Envelope::new(0.0, 0.0, 10.0, 10.0);
        let point = Envelope::of_point(10.0, 5.0);
        let far = Envelope::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&point));
        assert!(!a.intersects(&far));
    }
}
