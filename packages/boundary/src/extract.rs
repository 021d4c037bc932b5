//! Picks the target region's polygon out of a feature collection.

use geo::{Centroid, Polygon};
use place_sweep_geography_models::LatLng;
use place_sweep_spatial::parse::geometry_to_polygon;

use crate::BoundarySource;

/// Selects the region polygon from `features`.
///
/// Features are matched by name property first, then by code property.
/// If neither matches, the first polygon whose centroid falls inside
/// [`BoundarySource::centroid_bounds`] is used.
#[must_use]
pub fn select_polygon(
    features: &[serde_json::Value],
    source: &BoundarySource,
) -> Option<Polygon<f64>> {
    let matched = features
        .iter()
        .filter(|feature| matches_name(feature, source) || matches_code(feature, source))
        .find_map(|feature| geometry_to_polygon(&feature["geometry"]));

    if matched.is_some() {
        return matched;
    }

    let bounds = source.centroid_bounds?;
    log::info!("Region not found by name or code, searching by centroid...");

    features
        .iter()
        .filter_map(|feature| geometry_to_polygon(&feature["geometry"]))
        .find(|polygon| {
            polygon
                .centroid()
                .is_some_and(|c| bounds.contains(LatLng::new(c.y(), c.x())))
        })
}

fn matches_name(feature: &serde_json::Value, source: &BoundarySource) -> bool {
    source.name_properties.iter().any(|prop| {
        feature["properties"][prop.as_str()]
            .as_str()
            .map(str::trim)
            .is_some_and(|value| {
                source
                    .names
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(value))
            })
    })
}

fn matches_code(feature: &serde_json::Value, source: &BoundarySource) -> bool {
    let Some(code) = source.code else {
        return false;
    };

    source.code_properties.iter().any(|prop| {
        let value = &feature["properties"][prop.as_str()];
        value
            .as_i64()
            .or_else(|| value.as_str()?.trim().parse::<i64>().ok())
            == Some(code)
    })
}

#[cfg(test)]
mod tests {
    use geo::Area;
    use place_sweep_geography_models::BoundingBox;

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [[
                [x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]
            ]]
        })
    }

    fn source() -> BoundarySource {
        BoundarySource {
            urls: vec![],
            name_properties: vec!["boro_name".to_string(), "BoroName".to_string()],
            names: vec!["MANHATTAN".to_string(), "MN".to_string()],
            code_properties: vec!["boro_code".to_string(), "BoroCode".to_string()],
            code: Some(1),
            centroid_bounds: None,
        }
    }

    #[test]
    fn matches_by_name_case_insensitively() {
        let features = vec![
            serde_json::json!({ "properties": { "boro_name": "Brooklyn" }, "geometry": square(0.0, 0.0, 1.0) }),
            serde_json::json!({ "properties": { "BoroName": "manhattan" }, "geometry": square(5.0, 5.0, 2.0) }),
        ];
        let polygon = select_polygon(&features, &source()).unwrap();
        assert!((polygon.unsigned_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn matches_by_numeric_or_string_code() {
        let numeric = vec![
            serde_json::json!({ "properties": { "boro_code": 3 }, "geometry": square(0.0, 0.0, 1.0) }),
            serde_json::json!({ "properties": { "boro_code": 1 }, "geometry": square(0.0, 0.0, 3.0) }),
        ];
        let polygon = select_polygon(&numeric, &source()).unwrap();
        assert!((polygon.unsigned_area() - 9.0).abs() < 1e-9);

        let string = vec![
            serde_json::json!({ "properties": { "BoroCode": "1" }, "geometry": square(0.0, 0.0, 2.0) }),
        ];
        assert!(select_polygon(&string, &source()).is_some());
    }

    #[test]
    fn multipolygon_feature_uses_largest_member() {
        let features = vec![serde_json::json!({
            "properties": { "boro_name": "Manhattan" },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.0]]],
                    [[[1.0, 1.0], [4.0, 1.0], [4.0, 4.0], [1.0, 4.0], [1.0, 1.0]]]
                ]
            }
        })];
        let polygon = select_polygon(&features, &source()).unwrap();
        assert!((polygon.unsigned_area() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_centroid_search() {
        let features = vec![
            serde_json::json!({ "properties": { "name": "elsewhere" }, "geometry": square(10.0, 10.0, 1.0) }),
            serde_json::json!({ "properties": { "name": "unnamed" }, "geometry": square(-74.0, 40.78, 0.04) }),
        ];

        assert!(select_polygon(&features, &source()).is_none());

        let mut with_fallback = source();
        with_fallback.centroid_bounds = Some(BoundingBox::new(40.75, 40.85, -74.02, -73.93).unwrap());
        let polygon = select_polygon(&features, &with_fallback).unwrap();
        assert!((polygon.exterior().0[0].x - -74.0).abs() < 1e-9);
    }
}
