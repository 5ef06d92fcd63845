use crate::geo::MapPoint;

/// Contact and location details of the place
/// where an order can be collected.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickupPoint {
    pub carrier_name  : String,
    pub partner_name  : String,
    pub address_line1 : String,
    pub address_line2 : String,
    /// Single-line postal address, used for map searches.
    pub full_address  : Option<String>,
    pub phone         : Option<String>,
    pub email         : Option<String>,
    /// Free text, e.g. "Mon-Fri 8:00 - 18:00".
    pub pickup_hours  : Option<String>,
    pub image_url     : Option<String>,
    pub pos           : Option<MapPoint>,
}

impl PickupPoint {
    /// The stored position if both coordinates are set.
    #[must_use]
    pub fn known_pos(&self) -> Option<MapPoint> {
        self.pos.filter(MapPoint::is_known)
    }

    /// The address that can be looked up by a geocoder.
    #[must_use]
    pub fn address_query(&self) -> Option<&str> {
        self.full_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_known_positions() {
        let mut point = PickupPoint::default();
        assert!(point.known_pos().is_none());
        point.pos = Some(MapPoint::try_from_lat_lng_deg(0.0, 0.0).unwrap());
        assert!(point.known_pos().is_none());
        let pos = MapPoint::try_from_lat_lng_deg(40.41, -3.70).unwrap();
        point.pos = Some(pos);
        assert_eq!(point.known_pos(), Some(pos));
    }

    #[test]
    fn blank_address_is_no_query() {
        let mut point = PickupPoint::default();
        assert!(point.address_query().is_none());
        point.full_address = Some("   ".into());
        assert!(point.address_query().is_none());
        point.full_address = Some(" Calle Mayor 1, Madrid ".into());
        assert_eq!(point.address_query(), Some("Calle Mayor 1, Madrid"));
    }
}
