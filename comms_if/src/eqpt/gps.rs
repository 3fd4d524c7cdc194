//! # GPS Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position fix from the GPS receiver.
///
/// Latitude and longitude are decimal degrees, altitude is unitless as
/// recieved from the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt: f64,
}

/// Position report broadcast to the controller once per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosReport {
    pub robot_id: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GpsFix {
    /// Reserved out-of-range value signalling "no valid fix available".
    ///
    /// Used instead of a null so that the type stays uniform through the
    /// datastore and onto the wire.
    pub const FIX_LOST: GpsFix = GpsFix {
        lat_deg: 1000.0,
        lon_deg: 1000.0,
        alt: 1000.0,
    };

    /// True if this fix is the fix-lost sentinel.
    pub fn is_fix_lost(&self) -> bool {
        self.lat_deg == 1000.0 && self.lon_deg == 1000.0
    }
}

impl PosReport {
    /// Build a report for the given fix.
    pub fn from_fix(robot_id: &str, fix: &GpsFix) -> Self {
        Self {
            robot_id: String::from(robot_id),
            lat: fix.lat_deg,
            lon: fix.lon_deg,
            alt: fix.alt,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fix_lost_sentinel() {
        assert!(GpsFix::FIX_LOST.is_fix_lost());
        assert!(!GpsFix { lat_deg: 60.0, lon_deg: 24.0, alt: 12.0 }.is_fix_lost());
    }
}
