//! Coordinate Validator
//!
//! Turns untrusted point data emitted by a map capability into a trusted
//! [`Ring`]. Rejected points are dropped silently; callers only observe the
//! length of the result. No minimum length is enforced here, so rings of
//! zero, one or two points are legitimate intermediate results.
//!
//! Per point, in order:
//! 1. the entry must be a two-element structure: `[lng, lat]`, `{lng, lat}`
//!    or `{longitude, latitude}`
//! 2. both elements are coerced to `f64` (numeric text is accepted) and must
//!    be finite
//! 3. `|lng| <= 180` and `|lat| <= 90`
//! 4. survivors keep their original relative order
//! 5. a point equal to one already kept is dropped

use serde_json::{Map, Value};

use crate::data::{Coordinate, Ring};

/// Validate a sequence of raw points.
pub fn validate(raw: &[Value]) -> Ring {
    let mut ring = Ring::new();
    let mut rejected = 0usize;
    for entry in raw {
        match coerce_point(entry) {
            Some(coordinate) => {
                ring.push_unique(coordinate);
            }
            None => rejected += 1,
        }
    }
    if rejected > 0 {
        tracing::debug!(rejected, kept = ring.len(), "Dropped malformed coordinates");
    }
    ring
}

/// Validate an untyped value that should hold a sequence of points.
///
/// Anything other than a JSON array yields an empty ring.
pub fn validate_value(raw: &Value) -> Ring {
    match raw {
        Value::Array(entries) => validate(entries),
        _ => Ring::new(),
    }
}

/// Coerce a single raw point, if it survives every rule.
pub fn coerce_point(entry: &Value) -> Option<Coordinate> {
    let (lng, lat) = match entry {
        Value::Array(items) if items.len() == 2 => (&items[0], &items[1]),
        Value::Object(fields) => object_pair(fields)?,
        _ => return None,
    };
    Coordinate::new(coerce_number(lng)?, coerce_number(lat)?).ok()
}

fn object_pair(fields: &Map<String, Value>) -> Option<(&Value, &Value)> {
    if fields.len() != 2 {
        return None;
    }
    if let (Some(lng), Some(lat)) = (fields.get("lng"), fields.get("lat")) {
        return Some((lng, lat));
    }
    match (fields.get("longitude"), fields.get("latitude")) {
        (Some(lng), Some(lat)) => Some((lng, lat)),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
