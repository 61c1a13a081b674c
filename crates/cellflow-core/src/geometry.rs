//! Validated cell polygons in the raster's coordinate reference system.
use geo::{Area, BoundingRect, Contains, Coord, Intersects, LineString, Point, Polygon, Translate};

use crate::error::GeometryError;

/// Axis-aligned bounds in georeferenced units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A simple (non self-intersecting) polygon with a single exterior ring.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPolygon {
    poly: Polygon<f64>,
    bounds: Bounds,
}

impl CellPolygon {
    /// Validate and build a polygon from an exterior ring. The ring may be
    /// given open or closed; repeated consecutive vertices are dropped.
    pub fn new(ring: Vec<(f64, f64)>) -> Result<Self, GeometryError> {
        if let Some(index) = ring.iter().position(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(GeometryError::NonFinite { index });
        }

        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len() + 1);
        for (x, y) in ring {
            let c = Coord { x, y };
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        if coords.len() < 3 {
            return Err(GeometryError::TooFewVertices(coords.len()));
        }

        // Polygon::new closes the ring.
        let poly = Polygon::new(LineString::new(coords), vec![]);
        check_simple(poly.exterior())?;
        if poly.unsigned_area() == 0.0 {
            return Err(GeometryError::ZeroArea);
        }

        let rect = poly.bounding_rect().ok_or(GeometryError::TooFewVertices(0))?;
        let bounds = Bounds {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        };
        Ok(Self { poly, bounds })
    }

    /// Axis-aligned rectangle, mostly useful for tests and synthetic grids.
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, GeometryError> {
        Self::new(vec![(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)])
    }

    /// Copy of this polygon shifted by (`dx`, `dy`). Translation preserves
    /// validity, so no re-check is needed.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            poly: self.poly.translate(dx, dy),
            bounds: Bounds {
                min_x: self.bounds.min_x + dx,
                min_y: self.bounds.min_y + dy,
                max_x: self.bounds.max_x + dx,
                max_y: self.bounds.max_y + dy,
            },
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Strict interior test: points on the boundary are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.poly.contains(&Point::new(x, y))
    }

    /// Closed exterior ring; the last coordinate repeats the first.
    pub fn exterior(&self) -> &LineString<f64> {
        self.poly.exterior()
    }
}

/// Reject rings where any two non-adjacent segments touch.
fn check_simple(ring: &LineString<f64>) -> Result<(), GeometryError> {
    let segments: Vec<_> = ring.lines().collect();
    let n = segments.len();
    for i in 0..n {
        for j in (i + 2)..n {
            // First and last segments share the closing vertex.
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments[i].intersects(&segments[j]) {
                return Err(GeometryError::SelfIntersecting { first: i, second: j });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn open_and_closed_rings_are_equivalent() {
        let open = CellPolygon::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
        let closed =
            CellPolygon::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]).unwrap();
        assert_eq!(open, closed);
    }

    #[test]
    fn empty_and_degenerate_rings_are_rejected() {
        assert_eq!(CellPolygon::new(vec![]), Err(GeometryError::TooFewVertices(0)));
        assert_eq!(
            CellPolygon::new(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            Err(GeometryError::TooFewVertices(2))
        );
        assert_eq!(
            CellPolygon::new(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]),
            Err(GeometryError::ZeroArea)
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let err = CellPolygon::new(vec![(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)]).unwrap_err();
        assert_eq!(err, GeometryError::NonFinite { index: 1 });
    }

    #[test]
    fn bowtie_is_self_intersecting() {
        let err = CellPolygon::new(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, GeometryError::SelfIntersecting { .. }), "got {err:?}");
    }

    #[test]
    fn translate_moves_bounds_and_containment() {
        let p = CellPolygon::rect(0.0, 0.0, 0.0625, 0.0625).unwrap();
        let q = p.translate(0.03125, -0.03125);
        let b = q.bounds();
        assert_relative_eq!(b.min_x, 0.03125);
        assert_relative_eq!(b.max_x, 0.09375);
        assert_relative_eq!(b.min_y, -0.03125);
        assert_relative_eq!(b.max_y, 0.03125);
        assert!(q.contains(0.08, 0.0));
        assert!(!p.contains(0.08, 0.0));
    }

    #[test]
    fn boundary_points_are_outside() {
        let p = CellPolygon::rect(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(p.contains(0.5, 0.5));
        assert!(!p.contains(0.0, 0.5));
        assert!(!p.contains(1.0, 1.0));
    }
}
