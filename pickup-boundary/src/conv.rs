use super::*;
use pickup_entities as e;

/// The endpoint answered, but the carrier has no pickup point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotConfigured;

fn non_blank(from: Option<String>) -> Option<String> {
    from.filter(|s| !s.trim().is_empty())
}

impl TryFrom<PickupPointInfo> for e::pickup_point::PickupPoint {
    type Error = NotConfigured;

    fn try_from(from: PickupPointInfo) -> Result<Self, Self::Error> {
        let PickupPointInfo {
            error,
            carrier_name,
            partner_name,
            address_line1,
            address_line2,
            phone,
            email,
            pickup_hours,
            full_address,
            partner_image_url,
            latitude,
            longitude,
        } = from;
        if error {
            return Err(NotConfigured);
        }
        let pos = latitude
            .zip(longitude)
            .and_then(|(lat, lng)| e::geo::MapPoint::try_from_lat_lng_deg(lat, lng).ok());
        Ok(Self {
            carrier_name: carrier_name.unwrap_or_default(),
            partner_name: partner_name.unwrap_or_default(),
            address_line1: address_line1.unwrap_or_default(),
            address_line2: address_line2.unwrap_or_default(),
            full_address: non_blank(full_address),
            phone: non_blank(phone),
            email: non_blank(email),
            pickup_hours: non_blank(pickup_hours),
            image_url: non_blank(partner_image_url),
            pos,
        })
    }
}

impl From<e::pickup_point::PickupPoint> for PickupPointInfo {
    fn from(from: e::pickup_point::PickupPoint) -> Self {
        let e::pickup_point::PickupPoint {
            carrier_name,
            partner_name,
            address_line1,
            address_line2,
            full_address,
            phone,
            email,
            pickup_hours,
            image_url,
            pos,
        } = from;
        let pos = pos.unwrap_or_default();
        Self {
            error: false,
            carrier_name: Some(carrier_name),
            partner_name: Some(partner_name),
            address_line1: Some(address_line1),
            address_line2: Some(address_line2),
            phone,
            email,
            pickup_hours,
            full_address,
            partner_image_url: image_url,
            latitude: Some(pos.lat().to_deg()),
            longitude: Some(pos.lng().to_deg()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e::pickup_point::PickupPoint;

    #[test]
    fn reject_not_configured_marker() {
        let info = PickupPointInfo {
            error: true,
            carrier_name: Some("Correos".into()),
            ..Default::default()
        };
        assert_eq!(PickupPoint::try_from(info), Err(NotConfigured));
    }

    #[test]
    fn empty_strings_are_absent_values() {
        let info = PickupPointInfo {
            carrier_name: Some("Correos".into()),
            phone: Some("600111222".into()),
            email: Some(String::new()),
            pickup_hours: Some(" ".into()),
            full_address: Some("Calle Mayor 1, Madrid".into()),
            latitude: Some(0.0),
            longitude: Some(0.0),
            ..Default::default()
        };
        let point = PickupPoint::try_from(info).unwrap();
        assert_eq!(point.carrier_name, "Correos");
        assert_eq!(point.partner_name, "");
        assert_eq!(point.phone.as_deref(), Some("600111222"));
        assert!(point.email.is_none());
        assert!(point.pickup_hours.is_none());
        assert!(point.known_pos().is_none());
        assert_eq!(point.address_query(), Some("Calle Mayor 1, Madrid"));
    }

    #[test]
    fn keep_valid_coordinates_only() {
        let info = PickupPointInfo {
            latitude: Some(40.4168),
            longitude: Some(-3.7038),
            ..Default::default()
        };
        let point = PickupPoint::try_from(info).unwrap();
        let pos = point.known_pos().unwrap();
        assert_eq!(pos.lat().to_deg(), 40.4168);
        assert_eq!(pos.lng().to_deg(), -3.7038);

        let info = PickupPointInfo {
            latitude: Some(140.0),
            longitude: Some(-3.7038),
            ..Default::default()
        };
        assert!(PickupPoint::try_from(info).unwrap().pos.is_none());

        let info = PickupPointInfo {
            latitude: Some(40.4168),
            ..Default::default()
        };
        assert!(PickupPoint::try_from(info).unwrap().pos.is_none());
    }
}
