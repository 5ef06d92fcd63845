use async_trait::async_trait;

use crate::entities::MapPoint;

#[async_trait(?Send)]
pub trait GeoCodingGateway {
    /// Best effort: every failure is reported as `None`.
    async fn resolve_address_lat_lng(&self, addr: &str) -> Option<MapPoint>;
}
