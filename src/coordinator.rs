//! Request sequencing and stale-response reconciliation.
//!
//! Backend calls run on per-request worker threads and report back over a
//! single channel; the owning thread drains completions, so the accept/stale
//! decision and the watermark advance happen as one step with no locking.
//! Superseded requests are never cancelled — their responses are filtered at
//! acceptance time instead, trading wasted bandwidth for simplicity.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Instant;

use crate::error::SearchError;
use crate::geocoder::{Geocoder, NoopGeocoder, resolvable_name};
use crate::types::{GeocodeFeature, GeocodeQuery, LookupQuery, NearQuery, ResultSet};

/// Identifier handed back by every dispatch; matches the id on the
/// corresponding [`Completion`].
pub type RequestId = u64;

/// Logical operation a request was dispatched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Search,
    Autocomplete,
    Near,
    Select,
    Lookup,
}

/// Bookkeeping for one in-flight request, discarded once it resolves.
///
/// `seq` is assigned on the owning thread in dispatch order, so comparing
/// sequence numbers compares monotonic dispatch time.
#[derive(Debug, Clone, Copy)]
struct RequestRecord {
    seq: u64,
    dispatched_at: Instant,
    kind: RequestKind,
}

/// Outcome of one dispatched request. A completion carries a result or an
/// error or neither — never both.
#[derive(Debug)]
pub enum Delivery {
    /// Fresh results; the live result set should be replaced wholesale.
    Accepted(ResultSet),
    /// The request succeeded, but a later-dispatched response had already
    /// been accepted. A deliberate no-op, not an error.
    Stale,
    /// The request failed; show the message and move on.
    Failed(SearchError),
}

/// A resolved request, drained from [`RequestCoordinator::poll_completions`].
#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub kind: RequestKind,
    pub delivery: Delivery,
}

struct ResponseEnvelope {
    seq: u64,
    result: Result<ResultSet, SearchError>,
}

/// Owns request sequencing and the acceptance watermark.
pub struct RequestCoordinator {
    geocoder: Arc<dyn Geocoder>,
    response_tx: Sender<ResponseEnvelope>,
    response_rx: Receiver<ResponseEnvelope>,
    pending: HashMap<u64, RequestRecord>,
    next_seq: u64,
    /// Sequence number of the last response accepted and delivered. Only
    /// accepted deliveries advance it; failures never do.
    watermark: u64,
}

impl RequestCoordinator {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        let (response_tx, response_rx) = mpsc::channel();
        Self {
            geocoder,
            response_tx,
            response_rx,
            pending: HashMap::new(),
            next_seq: 0,
            watermark: 0,
        }
    }

    /// Coordinator that fails every call with [`SearchError::NotConfigured`].
    pub fn unconfigured() -> Self {
        Self::new(Arc::new(NoopGeocoder))
    }

    /// Full-text query, dispatched immediately and never throttled.
    pub fn search(&mut self, query: &GeocodeQuery) -> RequestId {
        let query = query.clone();
        self.dispatch(RequestKind::Search, move |geocoder| geocoder.search(&query))
    }

    /// Typeahead query. Same call shape as [`search`](Self::search); rate
    /// limiting is the caller's policy (see [`Throttle`](crate::Throttle)).
    pub fn autocomplete(&mut self, query: &GeocodeQuery) -> RequestId {
        let query = query.clone();
        self.dispatch(RequestKind::Autocomplete, move |geocoder| {
            geocoder.autocomplete(&query)
        })
    }

    /// Reverse geocode by coordinate and accuracy radius.
    pub fn near(&mut self, query: &NearQuery) -> RequestId {
        let query = *query;
        self.dispatch(RequestKind::Near, move |geocoder| geocoder.near(&query))
    }

    /// House-number level lookup of a previously returned id.
    pub fn lookup(&mut self, query: &LookupQuery) -> RequestId {
        let query = query.clone();
        self.dispatch(RequestKind::Lookup, move |geocoder| geocoder.lookup(&query))
    }

    /// Follow-up query expanding an intermediate feature (e.g. a street into
    /// house-number suggestions). A feature without a usable name is rejected
    /// here, before anything is dispatched.
    pub fn select_feature(&mut self, feature: &GeocodeFeature) -> Result<RequestId, SearchError> {
        resolvable_name(feature)?;
        let feature = feature.clone();
        Ok(self.dispatch(RequestKind::Select, move |geocoder| {
            geocoder.select(&feature)
        }))
    }

    /// True when the backend marked this feature as further resolvable.
    pub fn can_resolve(&self, feature: &GeocodeFeature) -> bool {
        self.geocoder.can_resolve(feature)
    }

    /// Requests still awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Drain every response that has arrived since the last poll.
    ///
    /// Must be called from the thread that owns the coordinator; this is
    /// the single place where the watermark moves.
    pub fn poll_completions(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        loop {
            match self.response_rx.try_recv() {
                Ok(envelope) => {
                    if let Some(completion) = self.handle_envelope(envelope) {
                        completions.push(completion);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        completions
    }

    fn dispatch(
        &mut self,
        kind: RequestKind,
        job: impl FnOnce(&dyn Geocoder) -> Result<ResultSet, SearchError> + Send + 'static,
    ) -> RequestId {
        self.next_seq += 1;
        let record = RequestRecord {
            seq: self.next_seq,
            dispatched_at: Instant::now(),
            kind,
        };
        self.pending.insert(record.seq, record);
        log::debug!("dispatching {kind:?} request #{}", record.seq);

        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.response_tx.clone();
        let seq = record.seq;
        thread::spawn(move || {
            let result = job(geocoder.as_ref());
            // The receiver is gone if the coordinator was dropped.
            let _ = tx.send(ResponseEnvelope { seq, result });
        });
        seq
    }

    fn handle_envelope(&mut self, envelope: ResponseEnvelope) -> Option<Completion> {
        let record = self.pending.remove(&envelope.seq)?;
        let delivery = match envelope.result {
            Ok(results) => {
                if record.seq > self.watermark {
                    self.watermark = record.seq;
                    Delivery::Accepted(results)
                } else {
                    log::debug!(
                        "ignoring stale {:?} response #{} dispatched {:?} ago (watermark #{})",
                        record.kind,
                        record.seq,
                        record.dispatched_at.elapsed(),
                        self.watermark,
                    );
                    Delivery::Stale
                }
            }
            Err(error) => {
                log::warn!("{:?} request #{} failed: {error}", record.kind, record.seq);
                Delivery::Failed(error)
            }
        };
        Some(Completion {
            id: record.seq,
            kind: record.kind,
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::types::Coordinate;

    /// Backend whose calls block until the test drops the release sender,
    /// keeping the response channel quiet while envelopes are injected
    /// manually.
    struct BlockedGeocoder {
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl BlockedGeocoder {
        fn held() -> (mpsc::Sender<()>, Arc<Self>) {
            let (tx, rx) = mpsc::channel();
            (
                tx,
                Arc::new(Self {
                    release: Mutex::new(rx),
                }),
            )
        }

        fn wait(&self) -> Result<ResultSet, SearchError> {
            let _ = self.release.lock().unwrap().recv();
            Err(SearchError::NotConfigured)
        }
    }

    impl Geocoder for BlockedGeocoder {
        fn search(&self, _query: &GeocodeQuery) -> Result<ResultSet, SearchError> {
            self.wait()
        }

        fn autocomplete(&self, _query: &GeocodeQuery) -> Result<ResultSet, SearchError> {
            self.wait()
        }

        fn near(&self, _query: &NearQuery) -> Result<ResultSet, SearchError> {
            self.wait()
        }

        fn select(&self, _feature: &GeocodeFeature) -> Result<ResultSet, SearchError> {
            self.wait()
        }

        fn lookup(&self, _query: &LookupQuery) -> Result<ResultSet, SearchError> {
            self.wait()
        }

        fn can_resolve(&self, _feature: &GeocodeFeature) -> bool {
            false
        }
    }

    fn results(label: &str) -> ResultSet {
        ResultSet::new(vec![GeocodeFeature {
            id: None,
            label: label.to_string(),
            layer: Some("venue".to_string()),
            name: Some(label.to_string()),
            region: None,
            coordinates: Coordinate::new(52.52, 13.4),
            distance_meters: None,
            raw: serde_json::Map::new(),
        }])
    }

    fn wait_for_completions(coordinator: &mut RequestCoordinator) -> Vec<Completion> {
        for _ in 0..400 {
            let completions = coordinator.poll_completions();
            if !completions.is_empty() {
                return completions;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("no completion arrived");
    }

    #[test]
    fn out_of_order_success_is_dropped_once_newer_was_accepted() {
        let (release, geocoder) = BlockedGeocoder::held();
        let mut coordinator = RequestCoordinator::new(geocoder);
        let first = coordinator.search(&GeocodeQuery::new("alexander"));
        let second = coordinator.search(&GeocodeQuery::new("alexanderplatz"));

        // Responses arrive in reverse dispatch order.
        let newer = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: second,
                result: Ok(results("Alexanderplatz")),
            })
            .unwrap();
        assert!(matches!(newer.delivery, Delivery::Accepted(_)));

        let older = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: first,
                result: Ok(results("Alexanderstr.")),
            })
            .unwrap();
        assert!(matches!(older.delivery, Delivery::Stale));
        drop(release);
    }

    #[test]
    fn in_order_successes_are_both_delivered() {
        let (release, geocoder) = BlockedGeocoder::held();
        let mut coordinator = RequestCoordinator::new(geocoder);
        let first = coordinator.autocomplete(&GeocodeQuery::new("a"));
        let second = coordinator.autocomplete(&GeocodeQuery::new("al"));

        let one = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: first,
                result: Ok(results("A-Straße")),
            })
            .unwrap();
        assert!(matches!(one.delivery, Delivery::Accepted(_)));

        let two = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: second,
                result: Ok(results("Alte Allee")),
            })
            .unwrap();
        assert!(matches!(two.delivery, Delivery::Accepted(_)));
        drop(release);
    }

    #[test]
    fn failures_never_advance_the_watermark() {
        let (release, geocoder) = BlockedGeocoder::held();
        let mut coordinator = RequestCoordinator::new(geocoder);
        let older = coordinator.search(&GeocodeQuery::new("a"));
        let newer = coordinator.search(&GeocodeQuery::new("al"));

        // The newer request fails first; the older success must still land.
        let failed = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: newer,
                result: Err(SearchError::ServiceUnavailable),
            })
            .unwrap();
        assert!(matches!(
            failed.delivery,
            Delivery::Failed(SearchError::ServiceUnavailable)
        ));

        let accepted = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: older,
                result: Ok(results("A-Straße")),
            })
            .unwrap();
        assert!(matches!(accepted.delivery, Delivery::Accepted(_)));
        drop(release);
    }

    #[test]
    fn completions_report_the_request_kind_and_id() {
        let (release, geocoder) = BlockedGeocoder::held();
        let mut coordinator = RequestCoordinator::new(geocoder);
        let id = coordinator.near(&NearQuery::new(52.5, 13.4, 30.0));
        assert_eq!(coordinator.in_flight(), 1);

        let completion = coordinator
            .handle_envelope(ResponseEnvelope {
                seq: id,
                result: Ok(results("Fernsehturm")),
            })
            .unwrap();
        assert_eq!(completion.id, id);
        assert_eq!(completion.kind, RequestKind::Near);
        assert_eq!(coordinator.in_flight(), 0);
        drop(release);
    }

    #[test]
    fn select_without_a_name_is_rejected_before_dispatch() {
        let mut coordinator = RequestCoordinator::unconfigured();
        let mut feature = results("Museumsinsel").get(0).unwrap().clone();
        feature.name = Some(String::new());

        let error = coordinator.select_feature(&feature).unwrap_err();
        assert_eq!(
            error,
            SearchError::InvalidInput("selected feature has no name".to_string())
        );
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[test]
    fn unconfigured_coordinator_fails_with_not_configured() {
        let mut coordinator = RequestCoordinator::unconfigured();
        coordinator.search(&GeocodeQuery::new("alex"));

        let completions = wait_for_completions(&mut coordinator);
        assert_eq!(completions.len(), 1);
        assert!(matches!(
            completions[0].delivery,
            Delivery::Failed(SearchError::NotConfigured)
        ));
    }
}
