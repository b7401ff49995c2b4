use super::{BoundingBox, Coordinate};

/// Parameters for a text-driven geocoding call.
///
/// Built fresh for every request and never mutated after dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeQuery {
    pub text: String,
    /// Restrict results to these backend layer tags.
    pub layers: Option<Vec<String>>,
    /// Region scope, e.g. a district the backend understands.
    pub region: Option<String>,
    /// Focus point for relevance biasing.
    pub focus: Option<Coordinate>,
    /// Boundary rectangle for result filtering.
    pub bounds: Option<BoundingBox>,
}

impl GeocodeQuery {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_layers(mut self, layers: Vec<String>) -> Self {
        self.layers = Some(layers);
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_focus(mut self, focus: Coordinate) -> Self {
        self.focus = Some(focus);
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Wire parameters in the order the service documents them.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("text".to_string(), self.text.clone())];
        if let Some(layers) = &self.layers {
            params.push(("layers".to_string(), layers.join(",")));
        }
        if let Some(region) = &self.region {
            params.push(("region".to_string(), region.clone()));
        }
        if let Some(focus) = self.focus {
            params.push(("focus.point.lat".to_string(), focus.lat.to_string()));
            params.push(("focus.point.lon".to_string(), focus.lon.to_string()));
        }
        if let Some(bounds) = self.bounds {
            params.push(("boundary.rect.min_lon".to_string(), bounds.min_lon.to_string()));
            params.push(("boundary.rect.min_lat".to_string(), bounds.min_lat.to_string()));
            params.push(("boundary.rect.max_lon".to_string(), bounds.max_lon.to_string()));
            params.push(("boundary.rect.max_lat".to_string(), bounds.max_lat.to_string()));
        }
        params
    }
}

/// Reverse geocode by position and accuracy radius, used for "locate me".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearQuery {
    pub lat: f64,
    pub lon: f64,
    /// Accuracy radius in meters, as reported by the location source.
    pub accuracy: f64,
}

impl NearQuery {
    #[must_use]
    pub fn new(lat: f64, lon: f64, accuracy: f64) -> Self {
        Self { lat, lon, accuracy }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("lat".to_string(), self.lat.to_string()),
            ("lon".to_string(), self.lon.to_string()),
            ("acc".to_string(), self.accuracy.to_string()),
        ]
    }
}

/// House-number level lookup of a previously returned feature id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupQuery {
    pub id: String,
    pub house_number: Option<String>,
}

impl LookupQuery {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            house_number: None,
        }
    }

    #[must_use]
    pub fn with_house_number(mut self, house_number: impl Into<String>) -> Self {
        self.house_number = Some(house_number.into());
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("id".to_string(), self.id.clone())];
        if let Some(house_number) = &self.house_number {
            params.push(("housenr".to_string(), house_number.clone()));
        }
        params
    }
}
