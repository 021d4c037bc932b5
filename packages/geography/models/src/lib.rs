#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bounding boxes, grid cells, and search-radius math.
//!
//! A sweep area is described by a [`BoundingBox`] which the grid planner
//! subdivides into [`GridCell`]s. Each cell knows how to derive its own
//! cache key and the circular search radius that covers it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Approximate meters per degree of latitude.
///
/// Longitude degrees are scaled by `cos(latitude)` on top of this.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// A latitude/longitude pair in WGS84 degrees.
///
/// Serializes as `{"latitude": .., "longitude": ..}`, which is also the
/// shape the places provider uses for locations and circle centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl LatLng {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Returned when a bounding box violates `low < high` on either axis.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "invalid bounds: lat [{lat_low}, {lat_high}], lon [{lon_low}, {lon_high}] \
     (low must be strictly less than high)"
)]
pub struct InvalidBounds {
    /// Southern latitude.
    pub lat_low: f64,
    /// Northern latitude.
    pub lat_high: f64,
    /// Western longitude.
    pub lon_low: f64,
    /// Eastern longitude.
    pub lon_high: f64,
}

/// An axis-aligned rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude.
    pub lat_low: f64,
    /// Northern latitude.
    pub lat_high: f64,
    /// Western longitude.
    pub lon_low: f64,
    /// Eastern longitude.
    pub lon_high: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBounds`] if either axis is empty, inverted, or
    /// not finite.
    pub fn new(
        lat_low: f64,
        lat_high: f64,
        lon_low: f64,
        lon_high: f64,
    ) -> Result<Self, InvalidBounds> {
        let bounds = Self {
            lat_low,
            lat_high,
            lon_low,
            lon_high,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks the `low < high` invariant on both axes.
    ///
    /// Boxes deserialized from configuration bypass [`Self::new`], so
    /// callers validate them explicitly before use.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBounds`] if the invariant does not hold.
    pub fn validate(&self) -> Result<(), InvalidBounds> {
        let finite = [self.lat_low, self.lat_high, self.lon_low, self.lon_high]
            .iter()
            .all(|v| v.is_finite());

        if finite && self.lat_low < self.lat_high && self.lon_low < self.lon_high {
            Ok(())
        } else {
            Err(InvalidBounds {
                lat_low: self.lat_low,
                lat_high: self.lat_high,
                lon_low: self.lon_low,
                lon_high: self.lon_high,
            })
        }
    }

    /// Latitude extent in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.lat_high - self.lat_low
    }

    /// Longitude extent in degrees.
    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.lon_high - self.lon_low
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            f64::midpoint(self.lat_low, self.lat_high),
            f64::midpoint(self.lon_low, self.lon_high),
        )
    }

    /// Whether the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        (self.lat_low..=self.lat_high).contains(&point.latitude)
            && (self.lon_low..=self.lon_high).contains(&point.longitude)
    }
}

/// One rectangular subdivision of a sweep area.
///
/// Cells are identified by their four bounds, which double as the cache
/// key. Keys stay stable across runs as long as the bounding box and grid
/// resolution are unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Southern latitude.
    pub lat_low: f64,
    /// Western longitude.
    pub lon_low: f64,
    /// Northern latitude.
    pub lat_high: f64,
    /// Eastern longitude.
    pub lon_high: f64,
}

impl GridCell {
    /// The cell's bounds as a [`BoundingBox`].
    #[must_use]
    pub const fn bounds(&self) -> BoundingBox {
        BoundingBox {
            lat_low: self.lat_low,
            lat_high: self.lat_high,
            lon_low: self.lon_low,
            lon_high: self.lon_high,
        }
    }

    /// Cache key in `lat_low_lon_low_lat_high_lon_high` form.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.lat_low, self.lon_low, self.lat_high, self.lon_high
        )
    }

    /// Midpoint of the cell.
    #[must_use]
    pub fn center(&self) -> LatLng {
        self.bounds().center()
    }

    /// The four corners, SW, SE, NW, NE.
    #[must_use]
    pub const fn corners(&self) -> [LatLng; 4] {
        [
            LatLng::new(self.lat_low, self.lon_low),
            LatLng::new(self.lat_low, self.lon_high),
            LatLng::new(self.lat_high, self.lon_low),
            LatLng::new(self.lat_high, self.lon_high),
        ]
    }

    /// Corner-to-corner distance in meters.
    ///
    /// Uses the flat-earth approximation of [`METERS_PER_DEGREE`] with the
    /// longitude span scaled by `cos(center latitude)`.
    #[must_use]
    pub fn diagonal_meters(&self) -> f64 {
        let center = self.center();
        let lat_meters = (self.lat_high - self.lat_low) * METERS_PER_DEGREE;
        let lon_meters =
            (self.lon_high - self.lon_low) * METERS_PER_DEGREE * center.latitude.to_radians().cos();
        lat_meters.hypot(lon_meters)
    }

    /// Search radius in whole meters for a circle centered on this cell.
    ///
    /// The full diagonal plus `buffer_meters` reaches past every corner and
    /// into the neighboring cells, so adjacent searches overlap. Results
    /// are capped at `max_meters`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn search_radius_meters(&self, buffer_meters: f64, max_meters: u32) -> u32 {
        let radius = (self.diagonal_meters() + buffer_meters).max(0.0);
        if radius >= f64::from(max_meters) {
            max_meters
        } else {
            radius as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(BoundingBox::new(40.88, 40.70, -74.05, -73.90).is_err());
        assert!(BoundingBox::new(40.70, 40.88, -73.90, -74.05).is_err());
        assert!(BoundingBox::new(40.70, 40.70, -74.05, -73.90).is_err());
        assert!(BoundingBox::new(f64::NAN, 40.88, -74.05, -73.90).is_err());
        assert!(BoundingBox::new(40.70, 40.88, -74.05, -73.90).is_ok());
    }

    #[test]
    fn cache_key_uses_all_four_bounds() {
        let cell = GridCell {
            lat_low: 40.7,
            lon_low: -74.05,
            lat_high: 40.7072,
            lon_high: -74.0494,
        };
        assert_eq!(cell.cache_key(), "40.7_-74.05_40.7072_-74.0494");
    }

    #[test]
    fn radius_at_equator_covers_the_cell() {
        let cell = GridCell {
            lat_low: 0.0,
            lon_low: 0.0,
            lat_high: 0.01,
            lon_high: 0.01,
        };
        let center = cell.center();
        assert!(center.latitude.abs() < 0.01);

        // 0.01 deg on both axes at the equator is 1110 m per side.
        let diagonal = 1110.0_f64.hypot(1110.0);
        assert!((cell.diagonal_meters() - diagonal).abs() < 0.5);

        let radius = cell.search_radius_meters(100.0, 50_000);
        assert_eq!(radius, 1669);

        // The circle must reach the corners (half the diagonal away).
        assert!(f64::from(radius) > diagonal / 2.0);
    }

    #[test]
    fn radius_shrinks_longitude_span_away_from_equator() {
        let cell = GridCell {
            lat_low: 60.0,
            lon_low: 0.0,
            lat_high: 60.0,
            lon_high: 0.02,
        };
        // cos(60deg) = 0.5, so 0.02 deg of longitude is ~1110 m.
        assert!((cell.diagonal_meters() - 1110.0).abs() < 1.0);
    }

    #[test]
    fn radius_is_capped() {
        let cell = GridCell {
            lat_low: 0.0,
            lon_low: 0.0,
            lat_high: 1.0,
            lon_high: 1.0,
        };
        assert_eq!(cell.search_radius_meters(100.0, 50_000), 50_000);
    }

    #[test]
    fn corners_and_center() {
        let cell = GridCell {
            lat_low: 1.0,
            lon_low: 2.0,
            lat_high: 3.0,
            lon_high: 4.0,
        };
        assert_eq!(cell.center(), LatLng::new(2.0, 3.0));
        assert_eq!(cell.corners()[0], LatLng::new(1.0, 2.0));
        assert_eq!(cell.corners()[3], LatLng::new(3.0, 4.0));
        assert!(cell.bounds().contains(LatLng::new(3.0, 4.0)));
        assert!(!cell.bounds().contains(LatLng::new(3.1, 4.0)));
    }

    #[test]
    fn bounds_deserialize_from_json() {
        let bounds: BoundingBox = serde_json::from_str(
            r#"{"lat_low": 40.7, "lat_high": 40.88, "lon_low": -74.05, "lon_high": -73.9}"#,
        )
        .unwrap();
        assert!(bounds.validate().is_ok());
        assert!((bounds.lat_span() - 0.18).abs() < 1e-9);
    }
}
