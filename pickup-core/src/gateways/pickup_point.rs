use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{CarrierId, PickupPoint};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

#[async_trait(?Send)]
pub trait PickupPointGateway {
    /// Returns `Ok(None)` if no pickup point is configured for the carrier.
    async fn pickup_point(&self, carrier: CarrierId) -> Result<Option<PickupPoint>, FetchError>;
}
