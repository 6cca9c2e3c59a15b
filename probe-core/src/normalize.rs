use crate::error::QueryError;
use crate::model::QueryKey;
use crate::slots::TimeSlot;

/// Quantize a raw click into the canonical query identity.
///
/// Coordinates are rounded half-away-from-zero to 2 fractional digits, the
/// precision the location service expects; sub-degree floating noise from
/// the map widget must not fragment query identity. Latitude outside
/// [-90, 90] or longitude outside [-180, 180] is rejected. Points inside
/// the global range but outside the product's map bounds are accepted here
/// (bounding is a presentation concern) and may come back as `NoData`.
///
/// Pure and referentially transparent: same inputs, same key.
pub fn normalize(raw_lat: f64, raw_lng: f64, slot: TimeSlot) -> Result<QueryKey, QueryError> {
    let lat_centi = quantize(raw_lat, 90.0)?;
    let lng_centi = quantize(raw_lng, 180.0)?;
    Ok(QueryKey::new(lat_centi, lng_centi, slot))
}

/// Round to centi-degrees, rejecting non-finite values and anything
/// outside `[-limit, limit]`. `f64::round` ties away from zero.
fn quantize(value: f64, limit: f64) -> Result<i32, QueryError> {
    if !value.is_finite() || value < -limit || value > limit {
        return Err(QueryError::InvalidCoordinate);
    }
    Ok((value * 100.0).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::default_slot;

    #[test]
    fn quantizes_to_two_decimals() {
        let key = normalize(35.6789, 51.4012, default_slot()).expect("in range");
        assert_eq!(key.latitude(), 35.68);
        assert_eq!(key.longitude(), 51.40);
    }

    #[test]
    fn ties_round_away_from_zero() {
        // 10.125 and 2.125 are exactly representable, so the scaled value
        // lands exactly on .5.
        let key = normalize(10.125, -2.125, default_slot()).expect("in range");
        assert_eq!(key.latitude(), 10.13);
        assert_eq!(key.longitude(), -2.13);
    }

    #[test]
    fn idempotent_over_valid_range() {
        let slot = default_slot();
        for (lat, lng) in [(0.0, 0.0), (-89.994, 179.996), (35.675, 51.404), (12.3456, -98.7654)] {
            let once = normalize(lat, lng, slot).expect("in range");
            let twice = normalize(once.latitude(), once.longitude(), slot).expect("in range");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn accepts_range_endpoints() {
        assert!(normalize(90.0, 180.0, default_slot()).is_ok());
        assert!(normalize(-90.0, -180.0, default_slot()).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        for (lat, lng) in [(95.0, 0.0), (-90.01, 0.0), (0.0, 180.01), (0.0, -200.0)] {
            let err = normalize(lat, lng, default_slot()).unwrap_err();
            assert_eq!(err, QueryError::InvalidCoordinate);
        }
    }

    #[test]
    fn rejects_non_finite() {
        assert!(normalize(f64::NAN, 0.0, default_slot()).is_err());
        assert!(normalize(0.0, f64::INFINITY, default_slot()).is_err());
    }
}
