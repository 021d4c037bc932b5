//! The target-region polygon.

use geo::{Area, BoundingRect, Intersects, LineString, Point, Polygon, Rect, coord};
use place_sweep_geography_models::{BoundingBox, LatLng};

use crate::GeometryError;

/// An immutable region polygon in `(lon, lat)` order.
///
/// Loaded once per process and passed by reference to whatever needs it.
/// Interior rings (holes) are ignored; only the exterior ring matters for
/// sweep coverage.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    polygon: Polygon<f64>,
    envelope: Rect<f64>,
}

impl BoundaryPolygon {
    /// Wraps a [`Polygon`], validating its exterior ring.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidPolygon`] if the ring has fewer than
    /// three distinct vertices or contains non-finite coordinates.
    pub fn new(polygon: Polygon<f64>) -> Result<Self, GeometryError> {
        let exterior = polygon.exterior();

        if exterior.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::InvalidPolygon {
                message: "ring contains non-finite coordinates".to_string(),
            });
        }

        let mut distinct: Vec<(f64, f64)> = Vec::new();
        for c in exterior.coords() {
            if !distinct.iter().any(|&(x, y)| x == c.x && y == c.y) {
                distinct.push((c.x, c.y));
                if distinct.len() >= 3 {
                    break;
                }
            }
        }
        if distinct.len() < 3 {
            return Err(GeometryError::InvalidPolygon {
                message: format!("ring has {} distinct vertices, need 3", distinct.len()),
            });
        }

        let envelope = polygon
            .bounding_rect()
            .ok_or_else(|| GeometryError::InvalidPolygon {
                message: "ring has no extent".to_string(),
            })?;

        // Keep only the exterior ring.
        let polygon = Polygon::new(polygon.exterior().clone(), vec![]);

        Ok(Self { polygon, envelope })
    }

    /// Builds a polygon from a `[lon, lat]` ring. The ring is closed
    /// automatically if the last vertex differs from the first.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_ring(ring: &[[f64; 2]]) -> Result<Self, GeometryError> {
        let line: LineString<f64> = ring.iter().map(|&[x, y]| (x, y)).collect::<Vec<_>>().into();
        Self::new(Polygon::new(line, vec![]))
    }

    /// Whether the point lies inside the polygon or on its boundary.
    #[must_use]
    pub fn contains_or_on(&self, point: LatLng) -> bool {
        let p = Point::new(point.longitude, point.latitude);
        self.envelope.intersects(&p) && self.polygon.intersects(&p)
    }

    /// Whether the rectangle shares any point with the polygon, including
    /// a polygon edge passing through it with no vertex inside.
    #[must_use]
    pub fn intersects_rect(&self, bounds: &BoundingBox) -> bool {
        let rect = Rect::new(
            coord! { x: bounds.lon_low, y: bounds.lat_low },
            coord! { x: bounds.lon_high, y: bounds.lat_high },
        );
        self.envelope.intersects(&rect) && self.polygon.intersects(&rect)
    }

    /// The polygon's bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            lat_low: self.envelope.min().y,
            lat_high: self.envelope.max().y,
            lon_low: self.envelope.min().x,
            lon_high: self.envelope.max().x,
        }
    }

    /// Exterior ring as `[lon, lat]` pairs, closing vertex included.
    #[must_use]
    pub fn ring(&self) -> Vec<[f64; 2]> {
        self.polygon
            .exterior()
            .coords()
            .map(|c| [c.x, c.y])
            .collect()
    }

    /// Number of exterior ring vertices, closing vertex included.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.polygon.exterior().0.len()
    }

    /// Planar area in square degrees.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    /// The underlying [`Polygon`].
    #[must_use]
    pub const fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }
}
