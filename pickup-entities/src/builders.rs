pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::pickup_point_builder::*;

pub mod pickup_point_builder {

    use super::*;
    use crate::{geo::*, pickup_point::*};

    #[derive(Debug)]
    pub struct PickupPointBuild {
        point: PickupPoint,
    }

    impl PickupPointBuild {
        pub fn carrier_name(mut self, name: &str) -> Self {
            self.point.carrier_name = name.into();
            self
        }
        pub fn partner_name(mut self, name: &str) -> Self {
            self.point.partner_name = name.into();
            self
        }
        pub fn address_lines(mut self, line1: &str, line2: &str) -> Self {
            self.point.address_line1 = line1.into();
            self.point.address_line2 = line2.into();
            self
        }
        pub fn full_address(mut self, addr: &str) -> Self {
            self.point.full_address = Some(addr.into());
            self
        }
        pub fn phone(mut self, phone: &str) -> Self {
            self.point.phone = Some(phone.into());
            self
        }
        pub fn email(mut self, email: &str) -> Self {
            self.point.email = Some(email.into());
            self
        }
        pub fn pickup_hours(mut self, hours: &str) -> Self {
            self.point.pickup_hours = Some(hours.into());
            self
        }
        pub fn image_url(mut self, url: &str) -> Self {
            self.point.image_url = Some(url.into());
            self
        }
        pub fn pos(mut self, pos: MapPoint) -> Self {
            self.point.pos = Some(pos);
            self
        }
        pub fn finish(self) -> PickupPoint {
            self.point
        }
    }

    impl Builder for PickupPoint {
        type Build = PickupPointBuild;
        fn build() -> Self::Build {
            Self::Build {
                point: PickupPoint::default(),
            }
        }
    }
}
