//! # Area geometry engine
//!
//! Stateless containment and boundary-distance calculations over area
//! boundaries. Boundaries are rings of (lon, lat) points in decimal degrees,
//! implicitly closed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use nalgebra::{Point2, Vector2};

// Internal
use crate::areas::Area;
use comms_if::eqpt::gps::GpsFix;
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Mean Earth radius used for the great-circle distance.
///
/// Units: meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during geometry calculations.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Area \"{0}\" has a degenerate boundary of {1} points")]
    DegenerateBoundary(String, usize),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Determine whether the given area affects the vehicle at the given fix.
///
/// The raw containment result is XOR-combined with the area's `reversed`
/// flag, so a reversed area affects the vehicle while it is *outside* the
/// boundary.
///
/// Points exactly on an edge resolve by the crossing rule below, which is
/// deterministic but implementation-defined.
pub fn affects(area: &Area, fix: &GpsFix) -> Result<bool, GeometryError> {
    if area.boundary.len() < 3 {
        return Err(GeometryError::DegenerateBoundary(
            area.id.clone(),
            area.boundary.len(),
        ));
    }

    let point = Point2::new(fix.lon_deg, fix.lat_deg);

    Ok(contains(&area.boundary, &point) != area.reversed)
}

/// Great-circle distance from the fix to the closest point on the area's
/// boundary ring.
///
/// The closest point is found by a planar search in (lon, lat) map
/// coordinates and the distance to it is then computed with the haversine
/// formula. Downstream consumers depend on exactly this composition, do not
/// replace it with a geodesic nearest-point search.
///
/// Units: meters
pub fn distance_to_boundary(area: &Area, fix: &GpsFix) -> Result<f64, GeometryError> {
    // The ring needs at least two distinct points to have a boundary at all
    let distinct = match area.boundary.first() {
        Some(first) => area.boundary.iter().any(|p| p != first),
        None => false,
    };

    if !distinct {
        return Err(GeometryError::DegenerateBoundary(
            area.id.clone(),
            area.boundary.len(),
        ));
    }

    let point = Point2::new(fix.lon_deg, fix.lat_deg);
    let nearest = nearest_boundary_point(&area.boundary, &point);

    Ok(haversine(&point, &nearest))
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Ray-casting containment test against the closed ring.
///
/// Uses the even-odd crossing rule with a half-open comparison on the edge
/// endpoints, so shared vertices are counted exactly once.
fn contains(ring: &[Point2<f64>], point: &Point2<f64>) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let a = ring[i];
        let b = ring[j];

        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

/// Find the planar nearest point to `point` over every segment of the closed
/// ring.
fn nearest_boundary_point(ring: &[Point2<f64>], point: &Point2<f64>) -> Point2<f64> {
    let n = ring.len();
    let mut best = ring[0];
    let mut best_dist_sq = f64::INFINITY;

    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];

        let candidate = project_onto_segment(point, &a, &b);
        let dist_sq = (point - candidate).norm_squared();

        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = candidate;
        }
    }

    best
}

/// Project a point onto the segment `[a, b]`, clamping to the endpoints.
fn project_onto_segment(
    point: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Point2<f64> {
    let ab: Vector2<f64> = b - a;
    let len_sq = ab.norm_squared();

    // Zero-length segments project onto their single point
    if len_sq == 0.0 {
        return *a;
    }

    let t = clamp(&((point - a).dot(&ab) / len_sq), &0.0, &1.0);

    a + ab * t
}

/// Haversine great-circle distance between two (lon, lat) points in decimal
/// degrees.
///
/// Units: meters
fn haversine(p0: &Point2<f64>, p1: &Point2<f64>) -> f64 {
    let lon_0 = p0.x.to_radians();
    let lat_0 = p0.y.to_radians();
    let lon_1 = p1.x.to_radians();
    let lat_1 = p1.y.to_radians();

    let d_lon = lon_1 - lon_0;
    let d_lat = lat_1 - lat_0;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_0.cos() * lat_1.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    c * EARTH_RADIUS_M
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Build a test area from raw (lon, lat) pairs.
    fn area(id: &str, boundary: &[[f64; 2]], reversed: bool) -> Area {
        Area {
            id: String::from(id),
            label: format!("test_{}", id),
            kind: String::new(),
            boundary: boundary.iter().map(|p| Point2::new(p[0], p[1])).collect(),
            reversed,
            slowing_factor: 0,
            disables_inputs: false,
        }
    }

    fn fix(lon_deg: f64, lat_deg: f64) -> GpsFix {
        GpsFix {
            lat_deg,
            lon_deg,
            alt: 0.0,
        }
    }

    /// The bay at Töölönlahti, 21 points with the first repeated as the last.
    const TOOLONLAHTI: [[f64; 2]; 21] = [
        [24.9310255, 60.1786389],
        [24.9311113, 60.1784895],
        [24.931798, 60.1777852],
        [24.9326992, 60.1773157],
        [24.9339437, 60.1771876],
        [24.9352741, 60.1773797],
        [24.9366045, 60.1779346],
        [24.937892, 60.1789377],
        [24.9379349, 60.1801328],
        [24.9366045, 60.1810504],
        [24.9357462, 60.1817973],
        [24.93536, 60.1828643],
        [24.9351883, 60.1838885],
        [24.9344158, 60.184614],
        [24.9331284, 60.1842726],
        [24.932313, 60.1837605],
        [24.9321842, 60.1829496],
        [24.9318838, 60.1819254],
        [24.9314117, 60.1804742],
        [24.9317122, 60.1794285],
        [24.9310255, 60.1786389],
    ];

    #[test]
    fn test_affects_toolonlahti() {
        let bay = area("bay", &TOOLONLAHTI, false);

        assert!(affects(&bay, &fix(24.9344587, 60.1799407)).unwrap());
        assert!(affects(&bay, &fix(24.9343729, 60.1841233)).unwrap());
        assert!(!affects(&bay, &fix(24.9311543, 60.1794712)).unwrap());
    }

    #[test]
    fn test_affects_square() {
        let square = area(
            "1",
            &[[0.0, 0.0], [0.0, 5.0], [5.0, 5.0], [5.0, 0.0]],
            false,
        );

        assert!(affects(&square, &fix(2.5, 2.5)).unwrap());
        assert!(!affects(&square, &fix(50.0, 50.0)).unwrap());
    }

    #[test]
    fn test_affects_reversed_square() {
        let square = area(
            "2",
            &[[-10.0, -10.0], [-10.0, 10.0], [10.0, 10.0], [10.0, -10.0]],
            true,
        );

        // Reversed areas affect the vehicle while it is outside
        assert!(affects(&square, &fix(50.0, 50.0)).unwrap());
        assert!(!affects(&square, &fix(2.5, 2.5)).unwrap());
    }

    #[test]
    fn test_distance_to_boundary() {
        let bay = area("bay", &TOOLONLAHTI, false);

        let paris = fix(2.3522, 48.8566);
        let brisbane = fix(153.021072, -27.470125);

        let d_paris = distance_to_boundary(&bay, &paris).unwrap();
        let d_brisbane = distance_to_boundary(&bay, &brisbane).unwrap();

        assert!((d_paris - 1_909_000.0).abs() < 5_000.0, "got {}", d_paris);
        assert!(
            (d_brisbane - 14_705_000.0).abs() < 5_000.0,
            "got {}",
            d_brisbane
        );
    }

    #[test]
    fn test_distance_is_non_negative_and_zero_on_boundary() {
        let square = area(
            "1",
            &[[0.0, 0.0], [0.0, 5.0], [5.0, 5.0], [5.0, 0.0]],
            false,
        );

        // A vertex of the ring is at zero distance
        assert!(distance_to_boundary(&square, &fix(0.0, 0.0)).unwrap() < 1e-6);

        // A point on an edge is at zero distance
        assert!(distance_to_boundary(&square, &fix(0.0, 2.5)).unwrap() < 1e-6);

        // Nearby points approach zero from above
        let d = distance_to_boundary(&square, &fix(-0.0001, 2.5)).unwrap();
        assert!(d > 0.0 && d < 50.0, "got {}", d);
    }

    #[test]
    fn test_degenerate_boundaries() {
        let two_points = area("1", &[[0.0, 0.0], [1.0, 1.0]], false);
        assert!(matches!(
            affects(&two_points, &fix(0.5, 0.5)),
            Err(GeometryError::DegenerateBoundary(_, 2))
        ));

        // Distance only needs two distinct points
        assert!(distance_to_boundary(&two_points, &fix(0.5, 0.5)).is_ok());

        // A ring of identical points has no boundary
        let collapsed = area("2", &[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]], false);
        assert!(matches!(
            distance_to_boundary(&collapsed, &fix(0.5, 0.5)),
            Err(GeometryError::DegenerateBoundary(_, 3))
        ));

        let empty = area("3", &[], false);
        assert!(affects(&empty, &fix(0.0, 0.0)).is_err());
        assert!(distance_to_boundary(&empty, &fix(0.0, 0.0)).is_err());
    }
}
