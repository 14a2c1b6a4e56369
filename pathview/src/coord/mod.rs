//! Coordinate module
//!
//! Provides the validated [`Coordinate`] type plus the small amount of
//! great-circle math the tracker needs: distances for sample filtering and
//! route refresh, and stepping toward a target for simulated movement.

mod types;

pub use types::{CoordError, Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two coordinates in metres (haversine).
#[inline]
pub fn distance_m(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Initial bearing from `from` to `to`.
///
/// Returns degrees in [0, 360), where 0 = North, 90 = East.
pub fn bearing_deg(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = y.atan2(x).to_degrees();

    // Normalize to 0-360
    if bearing < 0.0 {
        bearing + 360.0
    } else {
        bearing
    }
}

/// Move from `from` toward `to` by at most `step_m` metres.
///
/// Returns `to` exactly once the remaining distance is within one step, so
/// repeated stepping always terminates on the target.
pub fn step_toward(from: &Coordinate, to: &Coordinate, step_m: f64) -> Coordinate {
    let remaining = distance_m(from, to);
    if remaining <= step_m || remaining == 0.0 {
        return *to;
    }

    // Linear interpolation is accurate enough for the short hops used here
    let fraction = step_m / remaining;
    Coordinate::new(
        from.latitude + (to.latitude - from.latitude) * fraction,
        from.longitude + (to.longitude - from.longitude) * fraction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_accepts_valid() {
        let coord = Coordinate::try_new(-29.3409, -49.7267).unwrap();
        assert_eq!(coord.latitude, -29.3409);
        assert_eq!(coord.longitude, -49.7267);
    }

    #[test]
    fn test_try_new_rejects_latitude() {
        assert_eq!(
            Coordinate::try_new(91.0, 0.0),
            Err(CoordError::InvalidLatitude(91.0))
        );
    }

    #[test]
    fn test_try_new_rejects_longitude() {
        assert_eq!(
            Coordinate::try_new(0.0, -180.5),
            Err(CoordError::InvalidLongitude(-180.5))
        );
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let a = Coordinate::new(53.5, 10.0);
        assert_eq!(distance_m(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is ~111.2 km
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = distance_m(&a, &b);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_distance_to_destination_is_short() {
        // Sample from the default scenario: a few hundred metres apart
        let device = Coordinate::new(-29.34, -49.72);
        let destination = Coordinate::new(-29.3409, -49.7267);
        let d = distance_m(&device, &destination);
        assert!(d > 500.0 && d < 800.0, "got {}", d);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((bearing_deg(&origin, &Coordinate::new(1.0, 0.0)) - 0.0).abs() < 0.01);
        assert!((bearing_deg(&origin, &Coordinate::new(0.0, 1.0)) - 90.0).abs() < 0.01);
        assert!((bearing_deg(&origin, &Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 0.01);
        assert!((bearing_deg(&origin, &Coordinate::new(0.0, -1.0)) - 270.0).abs() < 0.01);
    }

    #[test]
    fn test_step_toward_lands_on_target() {
        let from = Coordinate::new(-29.34, -49.72);
        let to = Coordinate::new(-29.3409, -49.7267);
        assert_eq!(step_toward(&from, &to, 10_000.0), to);
    }

    #[test]
    fn test_step_toward_moves_closer() {
        let from = Coordinate::new(-29.34, -49.72);
        let to = Coordinate::new(-29.3409, -49.7267);
        let next = step_toward(&from, &to, 50.0);
        let before = distance_m(&from, &to);
        let after = distance_m(&next, &to);
        assert!((before - after - 50.0).abs() < 1.0, "moved {}", before - after);
    }

    // Property-based tests using proptest
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_distance_is_symmetric(
                lat1 in -85.0..85.0_f64,
                lon1 in -179.0..179.0_f64,
                lat2 in -85.0..85.0_f64,
                lon2 in -179.0..179.0_f64
            ) {
                let a = Coordinate::new(lat1, lon1);
                let b = Coordinate::new(lat2, lon2);
                let ab = distance_m(&a, &b);
                let ba = distance_m(&b, &a);
                prop_assert!((ab - ba).abs() < 1e-6, "{} != {}", ab, ba);
            }

            #[test]
            fn test_bearing_in_range(
                lat1 in -85.0..85.0_f64,
                lon1 in -179.0..179.0_f64,
                lat2 in -85.0..85.0_f64,
                lon2 in -179.0..179.0_f64
            ) {
                let bearing = bearing_deg(&Coordinate::new(lat1, lon1), &Coordinate::new(lat2, lon2));
                prop_assert!((0.0..360.0).contains(&bearing), "bearing {} out of range", bearing);
            }

            #[test]
            fn test_step_never_overshoots(
                lat in -60.0..60.0_f64,
                lon in -170.0..170.0_f64,
                dlat in -0.05..0.05_f64,
                dlon in -0.05..0.05_f64,
                step in 1.0..500.0_f64
            ) {
                let from = Coordinate::new(lat, lon);
                let to = Coordinate::new(lat + dlat, lon + dlon);
                let next = step_toward(&from, &to, step);
                prop_assert!(distance_m(&next, &to) <= distance_m(&from, &to) + 1.0);
            }
        }
    }
}
