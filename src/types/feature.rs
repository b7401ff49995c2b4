use serde::Deserialize;
use serde_json::{Map, Value};

use super::Coordinate;

/// One geocoded candidate (place, address, street) returned by the backend.
///
/// The typed fields cover what the core itself needs; `raw` keeps the
/// backend's `properties` object verbatim so embedders can reach anything
/// else. Features are produced only by the backend and never mutated here.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeFeature {
    pub id: Option<String>,
    /// Human-readable display label.
    pub label: String,
    /// Backend-assigned category tag, e.g. "venue", "address", "street".
    pub layer: Option<String>,
    /// Bare name, used as the text of a select follow-up query.
    pub name: Option<String>,
    pub region: Option<String>,
    pub coordinates: Coordinate,
    pub distance_meters: Option<f64>,
    /// The backend's `properties` object, untouched.
    pub raw: Map<String, Value>,
}

/// Backend-ordered sequence of features.
///
/// Relevance order is the backend's; the core never re-sorts. An accepted
/// response replaces the live set wholesale, never merges into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    features: Vec<GeocodeFeature>,
}

impl ResultSet {
    #[must_use]
    pub fn new(features: Vec<GeocodeFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GeocodeFeature> {
        self.features.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeocodeFeature> {
        self.features.iter()
    }

    /// Parse the backend's feature collection body.
    pub fn from_body(body: &Value) -> Result<Self, serde_json::Error> {
        let collection: WireCollection = serde_json::from_value(body.clone())?;
        Ok(Self {
            features: collection
                .features
                .into_iter()
                .map(GeocodeFeature::from_wire)
                .collect(),
        })
    }
}

impl From<Vec<GeocodeFeature>> for ResultSet {
    fn from(features: Vec<GeocodeFeature>) -> Self {
        Self::new(features)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a GeocodeFeature;
    type IntoIter = std::slice::Iter<'a, GeocodeFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[derive(Debug, Deserialize)]
struct WireCollection {
    #[serde(default)]
    features: Vec<WireFeature>,
}

#[derive(Debug, Deserialize)]
struct WireFeature {
    #[serde(default)]
    properties: Map<String, Value>,
    geometry: WireGeometry,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    /// GeoJSON position: longitude first.
    coordinates: [f64; 2],
}

impl GeocodeFeature {
    fn from_wire(wire: WireFeature) -> Self {
        let text = |key: &str| {
            wire.properties.get(key).and_then(|value| match value {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
        };
        Self {
            id: text("id"),
            label: text("label").unwrap_or_default(),
            layer: text("layer"),
            name: text("name"),
            region: text("region"),
            coordinates: Coordinate::new(
                wire.geometry.coordinates[1],
                wire.geometry.coordinates[0],
            ),
            distance_meters: wire
                .properties
                .get("distance")
                .and_then(Value::as_f64)
                .filter(|distance| *distance > 0.0),
            raw: wire.properties,
        }
    }
}
