//! Keyboard-driven selection state over the live result set.

use std::collections::VecDeque;

use crate::types::{GeocodeFeature, ResultSet};

/// Side effect emitted by a state transition. The owner drains these and
/// performs any rendering; the controller never touches presentation state.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The highlight moved; `None` means no row is highlighted.
    HighlightChanged(Option<usize>),
    /// The highlighted feature was confirmed.
    Confirmed(GeocodeFeature),
    /// Raw text was confirmed with no highlight active; run a full search.
    Submitted(String),
}

/// State machine over the result list and the highlighted index.
///
/// Idle (no results) and listing (results, no highlight) both carry
/// `highlighted == None`; a highlight only exists while results do. Moving
/// wraps circularly, so once a highlight exists, moving alone never returns
/// to the no-highlight state — only [`set_results`](Self::set_results),
/// [`reset`](Self::reset) or a confirm do.
#[derive(Debug, Default)]
pub struct SelectionController {
    results: ResultSet,
    highlighted: Option<usize>,
    events: VecDeque<SelectionEvent>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Index of the highlighted row, if any.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Feature under the highlight, if any.
    pub fn highlighted_feature(&self) -> Option<&GeocodeFeature> {
        self.highlighted.and_then(|index| self.results.get(index))
    }

    /// Replace the live result set wholesale. Always clears the highlight.
    pub fn set_results(&mut self, results: ResultSet) {
        self.results = results;
        self.set_highlight(None);
    }

    /// Move the highlight down, wrapping past the last row to the first.
    /// Entering from no highlight selects the first row. No-op without
    /// results.
    pub fn move_next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let next = match self.highlighted {
            Some(index) => (index + 1) % self.results.len(),
            None => 0,
        };
        self.set_highlight(Some(next));
    }

    /// Move the highlight up, wrapping past the first row to the last.
    /// Entering from no highlight selects the last row. No-op without
    /// results.
    pub fn move_previous(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let len = self.results.len();
        let previous = match self.highlighted {
            Some(index) => (index + len - 1) % len,
            None => len - 1,
        };
        self.set_highlight(Some(previous));
    }

    /// Confirm the highlighted feature, emitting it and resetting to idle.
    /// No-op without an active highlight.
    pub fn confirm_highlighted(&mut self) {
        let Some(feature) = self.highlighted_feature().cloned() else {
            return;
        };
        self.events.push_back(SelectionEvent::Confirmed(feature));
        self.reset();
    }

    /// Confirm raw typed text. Only valid while no highlight is active; the
    /// text passes through for a full search instead of a selected feature.
    pub fn confirm_typed(&mut self, text: impl Into<String>) {
        if self.highlighted.is_some() {
            return;
        }
        self.events.push_back(SelectionEvent::Submitted(text.into()));
    }

    /// Drop all results and the highlight.
    pub fn reset(&mut self) {
        self.results = ResultSet::default();
        self.set_highlight(None);
    }

    /// Next pending event, in emission order.
    pub fn poll_event(&mut self) -> Option<SelectionEvent> {
        self.events.pop_front()
    }

    fn set_highlight(&mut self, index: Option<usize>) {
        if self.highlighted != index {
            self.highlighted = index;
            self.events
                .push_back(SelectionEvent::HighlightChanged(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn feature(label: &str) -> GeocodeFeature {
        GeocodeFeature {
            id: None,
            label: label.to_string(),
            layer: Some("venue".to_string()),
            name: Some(label.to_string()),
            region: None,
            coordinates: Coordinate::new(52.52, 13.4),
            distance_meters: None,
            raw: serde_json::Map::new(),
        }
    }

    fn listing(count: usize) -> SelectionController {
        let mut controller = SelectionController::new();
        controller.set_results(ResultSet::new(
            (0..count).map(|i| feature(&format!("result {i}"))).collect(),
        ));
        while controller.poll_event().is_some() {}
        controller
    }

    #[test]
    fn moving_next_n_times_wraps_back_to_the_start() {
        let mut controller = listing(4);
        controller.move_next();
        let start = controller.highlighted();

        for _ in 0..4 {
            controller.move_next();
        }
        assert_eq!(controller.highlighted(), start);
    }

    #[test]
    fn previous_from_listing_selects_the_last_row() {
        let mut controller = listing(5);
        controller.move_next();
        assert_eq!(controller.highlighted(), Some(0));
        controller.move_previous();
        assert_eq!(controller.highlighted(), Some(4));
    }

    #[test]
    fn moving_alone_never_clears_the_highlight() {
        let mut controller = listing(3);
        controller.move_next();
        for _ in 0..20 {
            controller.move_previous();
            assert!(controller.highlighted().is_some());
            controller.move_next();
            assert!(controller.highlighted().is_some());
        }
    }

    #[test]
    fn moves_are_noops_without_results() {
        let mut controller = SelectionController::new();
        controller.move_next();
        controller.move_previous();
        assert_eq!(controller.highlighted(), None);
        assert_eq!(controller.poll_event(), None);
    }

    #[test]
    fn empty_results_from_any_state_reach_idle() {
        let mut controller = listing(3);
        controller.move_next();
        controller.move_next();

        controller.set_results(ResultSet::default());
        assert!(controller.results().is_empty());
        assert_eq!(controller.highlighted(), None);
    }

    #[test]
    fn set_results_always_clears_the_highlight() {
        let mut controller = listing(3);
        controller.move_next();
        controller.set_results(ResultSet::new(vec![feature("fresh")]));
        assert_eq!(controller.highlighted(), None);
    }

    #[test]
    fn confirm_emits_the_highlighted_feature_and_resets() {
        let mut controller = listing(3);
        controller.move_next();
        controller.move_next();
        while controller.poll_event().is_some() {}

        controller.confirm_highlighted();
        assert_eq!(
            controller.poll_event(),
            Some(SelectionEvent::Confirmed(feature("result 1")))
        );
        assert_eq!(
            controller.poll_event(),
            Some(SelectionEvent::HighlightChanged(None))
        );
        assert!(controller.results().is_empty());
    }

    #[test]
    fn confirm_without_highlight_is_a_noop() {
        let mut controller = listing(2);
        controller.confirm_highlighted();
        assert_eq!(controller.poll_event(), None);
        assert_eq!(controller.results().len(), 2);
    }

    #[test]
    fn typed_confirm_passes_text_through_only_without_highlight() {
        let mut controller = listing(2);
        controller.confirm_typed("alexanderplatz");
        assert_eq!(
            controller.poll_event(),
            Some(SelectionEvent::Submitted("alexanderplatz".to_string()))
        );

        controller.move_next();
        while controller.poll_event().is_some() {}
        controller.confirm_typed("ignored");
        assert_eq!(controller.poll_event(), None);
    }

    #[test]
    fn highlight_changes_are_emitted_in_order() {
        let mut controller = listing(3);
        controller.move_next();
        controller.move_next();
        assert_eq!(
            controller.poll_event(),
            Some(SelectionEvent::HighlightChanged(Some(0)))
        );
        assert_eq!(
            controller.poll_event(),
            Some(SelectionEvent::HighlightChanged(Some(1)))
        );
        assert_eq!(controller.poll_event(), None);
    }
}
