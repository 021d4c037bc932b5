//! `GeoJSON` geometry decoding.

use geo::{Area, MultiPolygon, Polygon};
use geojson::GeoJson;

/// Parses a `GeoJSON` geometry object into a single [`Polygon`].
///
/// A `MultiPolygon` (for example an island plus a handful of islets)
/// collapses to its largest member. Anything else yields `None`.
#[must_use]
pub fn geometry_to_polygon(geometry: &serde_json::Value) -> Option<Polygon<f64>> {
    let geojson: GeoJson = geometry.to_string().parse().ok()?;
    let GeoJson::Geometry(geom) = geojson else {
        return None;
    };

    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::Polygon(p) => Some(p),
        geo::Geometry::MultiPolygon(mp) => largest_polygon(mp),
        _ => None,
    }
}

/// Returns the member polygon with the greatest planar area.
#[must_use]
pub fn largest_polygon(multi: MultiPolygon<f64>) -> Option<Polygon<f64>> {
    multi
        .0
        .into_iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
}
