//! Core logic for a map-embedded geocoding search widget.
//!
//! The crate owns the three concerns that make search-as-you-type on a map
//! awkward: a throttled autocomplete request stream, reconciliation of
//! out-of-order network responses so a stale result list never overwrites a
//! fresher one, and keyboard-driven selection state. Rendering is left to an
//! external view layer that consumes [`ViewEvent`]s; the HTTP transport and
//! the geocoding backend are pluggable capabilities.

pub mod coordinator;
pub mod error;
pub mod geocoder;
pub mod options;
pub mod selection;
pub mod throttle;
pub mod transport;
pub mod types;
pub mod widget;

pub use crate::coordinator::{Completion, Delivery, RequestCoordinator, RequestId, RequestKind};
pub use crate::error::{SearchError, TransportError};
pub use crate::geocoder::{Geocoder, NoopGeocoder, RemoteGeocoder};
pub use crate::options::{API_RATE_LIMIT, WidgetOptions};
pub use crate::selection::{SelectionController, SelectionEvent};
pub use crate::throttle::Throttle;
#[cfg(feature = "http")]
pub use crate::transport::HttpTransport;
pub use crate::transport::Transport;
pub use crate::types::{
    BoundingBox, BoundsPolicy, Coordinate, FocusPolicy, GeocodeFeature, GeocodeQuery, LookupQuery,
    NearQuery, ResultSet,
};
pub use crate::widget::{Key, MapView, NullMapView, SearchWidget, ViewEvent};
