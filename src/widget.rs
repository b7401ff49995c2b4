//! Composition of request coordination, throttling and selection state.
//!
//! This is the widget minus its pixels: input changes feed a throttled
//! autocomplete stream, accepted responses replace the selection list,
//! keys drive the highlight, and everything observable surfaces as
//! [`ViewEvent`]s for an external renderer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use crate::coordinator::{Delivery, RequestCoordinator};
use crate::geocoder::Geocoder;
use crate::options::WidgetOptions;
use crate::selection::{SelectionController, SelectionEvent};
use crate::throttle::Throttle;
use crate::types::{
    BoundingBox, BoundsPolicy, Coordinate, FocusPolicy, GeocodeFeature, GeocodeQuery, NearQuery,
    ResultSet,
};

/// Map collaborator consulted when focus/bounds policies say `MapCurrent`.
pub trait MapView {
    fn center(&self) -> Option<Coordinate> {
        None
    }

    fn bounds(&self) -> Option<BoundingBox> {
        None
    }
}

/// [`MapView`] for embedders without map-derived biasing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMapView;

impl MapView for NullMapView {}

/// Keys the widget reacts to; everything else is the input field's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

/// Event consumed by whatever renders the search box, result list and map
/// markers.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The live result set was replaced wholesale.
    ResultsChanged(ResultSet),
    /// The highlight moved; `None` means no row is highlighted.
    HighlightChanged(Option<usize>),
    /// A feature was chosen; pan the map and drop a marker.
    Confirmed(GeocodeFeature),
    /// A request failed; show the message, the widget stays usable.
    Error(String),
}

/// The search widget core.
pub struct SearchWidget<M = NullMapView> {
    coordinator: RequestCoordinator,
    selection: SelectionController,
    throttle: Throttle<String>,
    options: WidgetOptions,
    map: M,
    events: VecDeque<ViewEvent>,
    last_value: String,
}

impl SearchWidget<NullMapView> {
    pub fn new(geocoder: Arc<dyn Geocoder>, options: WidgetOptions) -> Self {
        Self::with_map_view(geocoder, options, NullMapView)
    }
}

impl<M: MapView> SearchWidget<M> {
    pub fn with_map_view(geocoder: Arc<dyn Geocoder>, options: WidgetOptions, map: M) -> Self {
        Self {
            coordinator: RequestCoordinator::new(geocoder),
            selection: SelectionController::new(),
            throttle: Throttle::new(options.throttle_window()),
            options,
            map,
            events: VecDeque::new(),
            last_value: String::new(),
        }
    }

    /// Current selection state, for renderers that read instead of diffing
    /// events.
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Requests still awaiting a response, for loading indicators.
    pub fn in_flight(&self) -> usize {
        self.coordinator.in_flight()
    }

    /// The input field changed. Feeds the autocomplete throttle; input below
    /// the minimum length clears the result list instead.
    pub fn input_changed(&mut self, text: &str, now: Instant) {
        if text == self.last_value {
            return;
        }
        self.last_value = text.to_string();

        let long_enough = text.chars().count() >= self.options.min_autocomplete_input;
        if !self.options.autocomplete || !long_enough {
            if !self.selection.results().is_empty() {
                self.apply_results(ResultSet::default());
            }
            self.drain_selection_events();
            return;
        }

        if let Some(text) = self.throttle.submit(now, text.to_string()) {
            self.dispatch_autocomplete(&text);
        }
    }

    /// Keyboard input routed to selection state.
    pub fn key(&mut self, key: Key) {
        let had_results = !self.selection.results().is_empty();
        match key {
            Key::Down => self.selection.move_next(),
            Key::Up => self.selection.move_previous(),
            Key::Enter => self.confirm(),
            Key::Escape => self.selection.reset(),
        }
        self.drain_selection_events();
        if had_results && self.selection.results().is_empty() {
            self.events
                .push_back(ViewEvent::ResultsChanged(ResultSet::default()));
        }
    }

    /// Unthrottled full-text search.
    pub fn search(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let query = self.build_query(text);
        self.coordinator.search(&query);
    }

    /// The map reported a located position; look up what is nearby.
    pub fn locate_found(&mut self, lat: f64, lon: f64, accuracy: f64) {
        self.coordinator.near(&NearQuery::new(lat, lon, accuracy));
    }

    /// Pump pending work: fire due trailing autocomplete input and reconcile
    /// responses that have arrived. Call this from the event loop tick.
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.throttle.poll(now) {
            self.dispatch_autocomplete(&text);
        }

        for completion in self.coordinator.poll_completions() {
            match completion.delivery {
                Delivery::Accepted(results) => self.apply_results(results),
                // Already logged by the coordinator.
                Delivery::Stale => {}
                Delivery::Failed(error) => {
                    self.events.push_back(ViewEvent::Error(error.to_string()));
                }
            }
        }
        self.drain_selection_events();
    }

    /// Next pending view event.
    pub fn poll_event(&mut self) -> Option<ViewEvent> {
        self.events.pop_front()
    }

    fn confirm(&mut self) {
        if self.selection.highlighted().is_some() {
            self.selection.confirm_highlighted();
        } else {
            let text = self.last_value.clone();
            self.selection.confirm_typed(text);
        }
    }

    fn dispatch_autocomplete(&mut self, text: &str) {
        let query = self.build_query(text);
        self.coordinator.autocomplete(&query);
    }

    fn build_query(&self, text: &str) -> GeocodeQuery {
        let mut query = GeocodeQuery::new(text);
        if let Some(layers) = &self.options.layers {
            query = query.with_layers(layers.clone());
        }
        if let Some(region) = &self.options.region {
            query = query.with_region(region.clone());
        }
        let focus = match self.options.focus {
            FocusPolicy::Unset => None,
            FocusPolicy::MapCurrent => self.map.center(),
            FocusPolicy::Explicit { lat, lon } => Some(Coordinate::new(lat, lon)),
        };
        if let Some(focus) = focus {
            query = query.with_focus(focus);
        }
        let bounds = match self.options.bounds {
            BoundsPolicy::Unset => None,
            BoundsPolicy::MapCurrent => self.map.bounds(),
            BoundsPolicy::Explicit(bounds) => Some(bounds),
        };
        if let Some(bounds) = bounds {
            query = query.with_bounds(bounds);
        }
        query
    }

    fn apply_results(&mut self, results: ResultSet) {
        self.selection.set_results(results.clone());
        self.events.push_back(ViewEvent::ResultsChanged(results));
    }

    fn drain_selection_events(&mut self) {
        while let Some(event) = self.selection.poll_event() {
            match event {
                SelectionEvent::HighlightChanged(index) => {
                    self.events.push_back(ViewEvent::HighlightChanged(index));
                }
                SelectionEvent::Confirmed(feature) => {
                    if self.coordinator.can_resolve(&feature)
                        && let Err(error) = self.coordinator.select_feature(&feature)
                    {
                        self.events.push_back(ViewEvent::Error(error.to_string()));
                    }
                    self.events.push_back(ViewEvent::Confirmed(feature));
                }
                SelectionEvent::Submitted(text) => self.search(&text),
            }
        }
    }
}
