//! Venue configuration read by the geofence gate

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Public venue configuration (店铺位置)
///
/// `center`/`radius_m` absent means the geofence is not configured and
/// admission must fail closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<f64>,
}

/// A fully configured admission boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl VenueInfo {
    /// The admission boundary, or `None` when center or radius is missing/invalid
    pub fn geofence(&self) -> Option<Geofence> {
        match (self.center, self.radius_m) {
            (Some(center), Some(radius_m))
                if center.is_valid() && radius_m.is_finite() && radius_m > 0.0 =>
            {
                Some(Geofence { center, radius_m })
            }
            _ => None,
        }
    }
}
