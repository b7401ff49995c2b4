mod feature;
mod geo;
mod query;

pub use feature::{GeocodeFeature, ResultSet};
pub use geo::{BoundingBox, BoundsPolicy, Coordinate, FocusPolicy};
pub use query::{GeocodeQuery, LookupQuery, NearQuery};
