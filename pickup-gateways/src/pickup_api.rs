use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use pickup_boundary::{JsonRpcRequest, JsonRpcResponse, NoParams, PickupPointInfo};
use pickup_core::gateways::{FetchError, PickupPointGateway};
use pickup_entities::{carrier::CarrierId, pickup_point::PickupPoint};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Unexpected response status {0}")]
    Status(StatusCode),
    #[error("{0}")]
    Rpc(pickup_boundary::Error),
}

/// Client of the JSON route `/shop/pickup_point_info/<carrier_id>`.
#[derive(Debug)]
pub struct PickupApi {
    client: Client,
    base_url: String,
    next_request_id: AtomicU64,
}

impl PickupApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let client = crate::http::client(crate::http::DEFAULT_USER_AGENT, timeout)?;
        Ok(Self {
            client,
            base_url: crate::http::trim_base_url(base_url),
            next_request_id: AtomicU64::new(1),
        })
    }

    fn url(&self, carrier: CarrierId) -> String {
        format!("{}/shop/pickup_point_info/{carrier}", self.base_url)
    }

    /// Images are referenced relative to the shop.
    fn absolute_url(&self, url: String) -> String {
        if url.starts_with('/') && !url.starts_with("//") {
            format!("{}{url}", self.base_url)
        } else {
            url
        }
    }

    /// `Ok(None)` if the route answered with a `null` result.
    pub async fn pickup_point_info(
        &self,
        carrier: CarrierId,
    ) -> Result<Option<PickupPointInfo>, Error> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let url = self.url(carrier);
        log::debug!("Requesting {url} (id = {id})");
        let response = self
            .client
            .post(&url)
            .json(&JsonRpcRequest::call(id, NoParams {}))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let response: JsonRpcResponse<PickupPointInfo> = response.json().await?;
        response.into_result().map_err(Error::Rpc)
    }
}

#[async_trait(?Send)]
impl PickupPointGateway for PickupApi {
    async fn pickup_point(&self, carrier: CarrierId) -> Result<Option<PickupPoint>, FetchError> {
        let info = self
            .pickup_point_info(carrier)
            .await
            .map_err(|err| FetchError(err.to_string()))?;
        let Some(mut point) = info.and_then(|info| PickupPoint::try_from(info).ok()) else {
            return Ok(None);
        };
        point.image_url = point.image_url.map(|url| self.absolute_url(url));
        Ok(Some(point))
    }
}
