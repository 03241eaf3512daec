//! Geographic value types.
//!
//! A [`Coordinate`] is always finite and inside the WGS84 range; a [`Ring`]
//! is an ordered boundary whose insertion order is the traversal order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GeoError;

/// Minimum number of vertices in a publishable polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// A validated (longitude, latitude) pair.
///
/// Serialized as a plain `[lng, lat]` numeric pair, which is the form handed
/// to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

impl Coordinate {
    /// Largest absolute longitude.
    pub const MAX_LONGITUDE: f64 = 180.0;
    /// Largest absolute latitude.
    pub const MAX_LATITUDE: f64 = 90.0;

    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoError::NonFinite);
        }
        if longitude.abs() > Self::MAX_LONGITUDE || latitude.abs() > Self::MAX_LATITUDE {
            return Err(GeoError::OutOfRange {
                longitude,
                latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Plain `[lng, lat]` pair.
    pub fn to_pair(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Untyped JSON form, the same shape raw provider paths use.
    pub fn to_value(&self) -> Value {
        Value::from(vec![self.longitude, self.latitude])
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = GeoError;

    fn try_from(pair: [f64; 2]) -> Result<Self, Self::Error> {
        Coordinate::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_pair()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.longitude, self.latitude)
    }
}

/// Ordered sequence of coordinates describing a polygon boundary.
///
/// Deserialization goes through [`FromIterator`], so repeated points are
/// dropped on the way in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the ring has enough vertices to be committed as a polygon.
    pub fn is_publishable(&self) -> bool {
        self.0.len() >= MIN_POLYGON_POINTS
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.0.iter()
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.0.contains(coordinate)
    }

    /// Plain numeric pairs in boundary order.
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.0.iter().map(Coordinate::to_pair).collect()
    }

    /// Untyped JSON form, suitable for feeding back into the validator.
    pub fn to_values(&self) -> Vec<Value> {
        self.0.iter().map(Coordinate::to_value).collect()
    }

    /// Operator-facing listing: the point count and each point to six decimals.
    pub fn summary(&self) -> String {
        let points: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        if points.is_empty() {
            format!("{} points selected", self.0.len())
        } else {
            format!("{} points selected: {}", self.0.len(), points.join(" "))
        }
    }

    pub(crate) fn push_unique(&mut self, coordinate: Coordinate) -> bool {
        if self.0.contains(&coordinate) {
            return false;
        }
        self.0.push(coordinate);
        true
    }
}

impl FromIterator<Coordinate> for Ring {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        let mut ring = Ring::new();
        for coordinate in iter {
            ring.push_unique(coordinate);
        }
        ring
    }
}

impl From<Vec<Coordinate>> for Ring {
    fn from(points: Vec<Coordinate>) -> Self {
        points.into_iter().collect()
    }
}

impl From<Ring> for Vec<Coordinate> {
    fn from(ring: Ring) -> Self {
        ring.0
    }
}

impl<'a> IntoIterator for &'a Ring {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
