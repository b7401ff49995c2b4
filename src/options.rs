//! Embedder-facing configuration for the search widget.

use std::time::Duration;

use serde::Deserialize;

use crate::types::{BoundsPolicy, FocusPolicy};

/// Throttled time between subsequent autocomplete requests to the API.
pub const API_RATE_LIMIT: Duration = Duration::from_millis(250);

/// Behavior knobs for [`SearchWidget`](crate::SearchWidget).
///
/// Deserializable so embedders can splice it into their own configuration
/// layers; the crate itself never reads files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    /// Restrict results to these backend layer tags.
    pub layers: Option<Vec<String>>,
    /// Region scope forwarded on every text query.
    pub region: Option<String>,
    /// Focus point for relevance biasing.
    pub focus: FocusPolicy,
    /// Boundary rectangle for result filtering.
    pub bounds: BoundsPolicy,
    /// Minimum input length before autocomplete fires.
    pub min_autocomplete_input: usize,
    /// Whether keystrokes trigger autocomplete at all.
    pub autocomplete: bool,
    /// Milliseconds between autocomplete dispatches.
    pub throttle_ms: u64,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            layers: None,
            region: None,
            focus: FocusPolicy::Unset,
            bounds: BoundsPolicy::Unset,
            min_autocomplete_input: 1,
            autocomplete: true,
            throttle_ms: API_RATE_LIMIT.as_millis() as u64,
        }
    }
}

impl WidgetOptions {
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
    pub fn with_focus(mut self, focus: FocusPolicy) -> Self {
        self.focus = focus;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_min_autocomplete_input(mut self, length: usize) -> Self {
        self.min_autocomplete_input = length;
        self
    }

    #[must_use]
    pub fn with_autocomplete(mut self, enabled: bool) -> Self {
        self.autocomplete = enabled;
        self
    }

    #[must_use]
    pub fn with_throttle(mut self, window: Duration) -> Self {
        self.throttle_ms = window.as_millis() as u64;
        self
    }

    pub(crate) fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let options = WidgetOptions::default();
        assert_eq!(options.min_autocomplete_input, 1);
        assert!(options.autocomplete);
        assert_eq!(options.throttle_window(), API_RATE_LIMIT);
        assert_eq!(options.focus, FocusPolicy::Unset);
        assert_eq!(options.bounds, BoundsPolicy::Unset);
    }

    #[test]
    fn deserializes_with_partial_overrides() {
        let options: WidgetOptions = serde_json::from_str(
            r#"{
                "layers": ["venue", "address"],
                "min_autocomplete_input": 2,
                "focus": { "explicit": { "lat": 52.52, "lon": 13.4 } }
            }"#,
        )
        .unwrap();
        assert_eq!(
            options.layers,
            Some(vec!["venue".to_string(), "address".to_string()])
        );
        assert_eq!(options.min_autocomplete_input, 2);
        assert_eq!(options.focus, FocusPolicy::Explicit { lat: 52.52, lon: 13.4 });
        // Untouched fields keep their defaults.
        assert!(options.autocomplete);
        assert_eq!(options.throttle_ms, 250);
    }
}
