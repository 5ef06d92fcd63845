use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordRangeError {
    #[error("latitude out of range")]
    Latitude,
    #[error("longitude out of range")]
    Longitude,
}

/// Latitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct LatCoord(f64);

impl LatCoord {
    pub const MIN_DEG: f64 = -90.0;
    pub const MAX_DEG: f64 = 90.0;

    pub fn try_from_deg(deg: f64) -> Result<Self, CoordRangeError> {
        if deg.is_finite() && (Self::MIN_DEG..=Self::MAX_DEG).contains(&deg) {
            Ok(Self(deg))
        } else {
            Err(CoordRangeError::Latitude)
        }
    }

    #[must_use]
    pub const fn to_deg(self) -> f64 {
        self.0
    }
}

/// Longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct LngCoord(f64);

impl LngCoord {
    pub const MIN_DEG: f64 = -180.0;
    pub const MAX_DEG: f64 = 180.0;

    pub fn try_from_deg(deg: f64) -> Result<Self, CoordRangeError> {
        if deg.is_finite() && (Self::MIN_DEG..=Self::MAX_DEG).contains(&deg) {
            Ok(Self(deg))
        } else {
            Err(CoordRangeError::Longitude)
        }
    }

    #[must_use]
    pub const fn to_deg(self) -> f64 {
        self.0
    }
}

/// A position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapPoint {
    lat: LatCoord,
    lng: LngCoord,
}

impl MapPoint {
    #[must_use]
    pub const fn new(lat: LatCoord, lng: LngCoord) -> Self {
        Self { lat, lng }
    }

    pub fn try_from_lat_lng_deg(lat: f64, lng: f64) -> Result<Self, CoordRangeError> {
        Ok(Self::new(
            LatCoord::try_from_deg(lat)?,
            LngCoord::try_from_deg(lng)?,
        ))
    }

    #[must_use]
    pub const fn lat(&self) -> LatCoord {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> LngCoord {
        self.lng
    }

    /// Zero is used as "not set" for both coordinates,
    /// so a point is only known if neither of them is zero.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.lat.to_deg() != 0.0 && self.lng.to_deg() != 0.0
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat.to_deg(), self.lng.to_deg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_coordinates_out_of_range() {
        assert_eq!(
            MapPoint::try_from_lat_lng_deg(90.1, 0.0),
            Err(CoordRangeError::Latitude)
        );
        assert_eq!(
            MapPoint::try_from_lat_lng_deg(0.0, -180.5),
            Err(CoordRangeError::Longitude)
        );
        assert_eq!(
            MapPoint::try_from_lat_lng_deg(f64::NAN, 1.0),
            Err(CoordRangeError::Latitude)
        );
        assert!(MapPoint::try_from_lat_lng_deg(-90.0, 180.0).is_ok());
    }

    #[test]
    fn zero_coordinates_are_unknown() {
        assert!(!MapPoint::default().is_known());
        assert!(!MapPoint::try_from_lat_lng_deg(40.4, 0.0).unwrap().is_known());
        assert!(!MapPoint::try_from_lat_lng_deg(0.0, -3.7).unwrap().is_known());
        assert!(MapPoint::try_from_lat_lng_deg(40.4, -3.7).unwrap().is_known());
    }

    #[test]
    fn display_as_lat_lng_pair() {
        let pos = MapPoint::try_from_lat_lng_deg(40.5, -3.25).unwrap();
        assert_eq!(pos.to_string(), "40.5,-3.25");
    }
}
