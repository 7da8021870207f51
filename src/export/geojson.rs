//! GeoJSON conversion for assigned cell tables.
//!
//! Every cell becomes a Point feature whose id is its 1-based cell number
//! and whose properties carry `cell`, `region` and `origin`.

use crate::error::{Result, ReefError};
use crate::overrides::OverrideRules;
use crate::table::{AssignedCells, CellRecord, RegionOrigin};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use reefmatch_types::cell::wrap_longitude_360;
use serde_json::Value as JsonValue;

/// Output switches for GeoJSON export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Write longitudes on 0..360 so Pacific-spanning data stays contiguous.
    pub lon_360: bool,
}

impl ExportOptions {
    pub fn with_lon_360(mut self, lon_360: bool) -> Self {
        self.lon_360 = lon_360;
        self
    }
}

/// Converts the table to a feature collection, one feature per cell in
/// table order.
pub fn to_feature_collection(
    table: &AssignedCells,
    options: ExportOptions,
) -> Result<FeatureCollection> {
    let features = table
        .records()
        .into_iter()
        .map(|record| record_to_feature(record, options))
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Converts the table to a GeoJSON string.
pub fn to_geojson(table: &AssignedCells, options: ExportOptions) -> Result<String> {
    let collection = to_feature_collection(table, options)?;
    serde_json::to_string(&collection)
        .map_err(|e| ReefError::Serialization(format!("Failed to serialize cell table: {}", e)))
}

/// Converts override boxes to Polygon features, for reviewing corrections on
/// a map. Properties carry the rule index and the forced region.
pub fn overrides_to_feature_collection(rules: &OverrideRules) -> FeatureCollection {
    let features = rules
        .iter()
        .enumerate()
        .map(|(idx, rule)| {
            let polygon = rule.to_rect().to_polygon();
            let ring: Vec<Vec<f64>> = polygon
                .exterior()
                .coords()
                .map(|coord| vec![coord.x, coord.y])
                .collect();

            let mut properties = JsonObject::new();
            properties.insert("rule".to_string(), JsonValue::from(idx));
            properties.insert("region".to_string(), JsonValue::from(rule.region.clone()));

            Feature {
                bbox: Some(vec![rule.lon_min, rule.lat_min, rule.lon_max, rule.lat_max]),
                geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Parses a feature collection written by [`to_geojson`] back into a table.
///
/// Features must be Points numbered 1..=n in order. Longitudes are taken as
/// written, so a 0..360 export reads back on 0..360.
pub fn from_geojson(geojson: &str) -> Result<AssignedCells> {
    let parsed: GeoJson = geojson
        .parse()
        .map_err(|e| ReefError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;

    let collection = match parsed {
        GeoJson::FeatureCollection(collection) => collection,
        _ => {
            return Err(ReefError::InvalidInput(
                "GeoJSON is not a FeatureCollection".to_string(),
            ));
        }
    };

    let records = collection
        .features
        .iter()
        .enumerate()
        .map(|(idx, feature)| {
            feature_to_record(feature)
                .map_err(|e| ReefError::InvalidInput(format!("Feature at index {}: {}", idx, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    AssignedCells::from_records(&records)
}

fn record_to_feature(record: CellRecord, options: ExportOptions) -> Result<Feature> {
    let lon = if options.lon_360 {
        wrap_longitude_360(record.lon)
    } else {
        record.lon
    };

    let origin = serde_json::to_value(record.origin).map_err(|e| {
        ReefError::Serialization(format!(
            "Failed to serialize origin of cell {}: {}",
            record.cell, e
        ))
    })?;

    let mut properties = JsonObject::new();
    properties.insert("cell".to_string(), JsonValue::from(record.cell));
    properties.insert("region".to_string(), JsonValue::from(record.region));
    properties.insert("origin".to_string(), origin);

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![lon, record.lat]))),
        id: Some(Id::Number(serde_json::Number::from(record.cell))),
        properties: Some(properties),
        foreign_members: None,
    })
}

fn feature_to_record(feature: &Feature) -> Result<CellRecord> {
    let (lon, lat) = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Point(coords)) if coords.len() >= 2 => (coords[0], coords[1]),
        Some(Value::Point(_)) => {
            return Err(ReefError::InvalidInput(
                "Point must have at least 2 coordinates".to_string(),
            ));
        }
        _ => {
            return Err(ReefError::InvalidInput(
                "Feature geometry is not a Point".to_string(),
            ));
        }
    };

    let cell = feature
        .property("cell")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| ReefError::InvalidInput("Missing 'cell' property".to_string()))?;

    let region = feature
        .property("region")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ReefError::InvalidInput("Missing 'region' property".to_string()))?;

    let origin: Option<RegionOrigin> = match feature.property("origin") {
        None | Some(JsonValue::Null) => None,
        Some(value) => Some(
            serde_json::from_value(value.clone())
                .map_err(|e| ReefError::InvalidInput(format!("Invalid 'origin': {}", e)))?,
        ),
    };

    Ok(CellRecord {
        cell: cell as usize,
        lon,
        lat,
        region: region.to_string(),
        origin,
    })
}
