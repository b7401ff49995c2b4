use serde::{Deserialize, Serialize};

/// A WGS84 point. The backend's wire format carries longitude first
/// (GeoJSON order); named fields keep that from leaking into callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned boundary rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// Where the focus point for relevance biasing comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPolicy {
    /// No focus point is sent.
    #[default]
    Unset,
    /// Use the map view's current center.
    MapCurrent,
    /// Use a fixed point.
    Explicit { lat: f64, lon: f64 },
}

/// Where the boundary rectangle for result filtering comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// No boundary is sent.
    #[default]
    Unset,
    /// Use the map view's current bounds.
    MapCurrent,
    /// Use a fixed rectangle.
    Explicit(BoundingBox),
}
