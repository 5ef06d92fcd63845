use std::cell::Cell;

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use pickup_boundary::{JsonRpcRequest, JsonRpcResponse, NoParams, PickupPointInfo};
use pickup_core::gateways::{FetchError, GeoCodingGateway, PickupPointGateway};
use pickup_entities::{carrier::CarrierId, geo::MapPoint, pickup_point::PickupPoint};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Rpc(pickup_boundary::Error),
}

impl From<gloo_net::Error> for Error {
    fn from(err: gloo_net::Error) -> Self {
        Self::Fetch(format!("{err}"))
    }
}

async fn into_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    // ensure we've got 2xx status
    if response.ok() {
        Ok(response.json().await?)
    } else {
        Err(Error::Fetch(format!(
            "Unexpected response status {} {}",
            response.status(),
            response.status_text()
        )))
    }
}

/// Client of the JSON route `/shop/pickup_point_info/<carrier_id>`
/// of the shop that serves the page.
#[derive(Debug)]
pub struct PickupApi {
    url: String,
    next_request_id: Cell<u64>,
}

impl PickupApi {
    /// An empty `url` addresses the origin of the page.
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_owned(),
            next_request_id: Cell::new(1),
        }
    }

    pub async fn pickup_point_info(&self, carrier: CarrierId) -> Result<Option<PickupPointInfo>> {
        let id = self.next_request_id.get();
        self.next_request_id.set(id + 1);
        let url = format!("{}/shop/pickup_point_info/{carrier}", self.url);
        let response = Request::post(&url)
            .json(&JsonRpcRequest::call(id, NoParams {}))?
            .send()
            .await?;
        let response: JsonRpcResponse<PickupPointInfo> = into_json(response).await?;
        response.into_result().map_err(Error::Rpc)
    }
}

#[async_trait(?Send)]
impl PickupPointGateway for PickupApi {
    async fn pickup_point(
        &self,
        carrier: CarrierId,
    ) -> std::result::Result<Option<PickupPoint>, FetchError> {
        let info = self
            .pickup_point_info(carrier)
            .await
            .map_err(|err| FetchError(err.to_string()))?;
        Ok(info.and_then(|info| PickupPoint::try_from(info).ok()))
    }
}

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Place {
    fn map_point(&self) -> Option<MapPoint> {
        let lat = self.lat.trim().parse().ok()?;
        let lng = self.lon.trim().parse().ok()?;
        MapPoint::try_from_lat_lng_deg(lat, lng).ok()
    }
}

/// Geocoding with the Nominatim search API.
///
/// Browsers don't allow to override the user agent,
/// the referer of the page identifies the application.
#[derive(Debug)]
pub struct Nominatim {
    url: String,
    language: String,
}

impl Nominatim {
    #[must_use]
    pub fn new(url: &str, language: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_owned(),
            language: language.to_owned(),
        }
    }

    async fn search(&self, addr: &str) -> Result<Vec<Place>> {
        let response = Request::get(&format!("{}/search", self.url))
            .query([("q", addr), ("format", "json"), ("limit", "1")])
            .header("Accept-Language", &self.language)
            .send()
            .await?;
        into_json(response).await
    }
}

#[async_trait(?Send)]
impl GeoCodingGateway for Nominatim {
    async fn resolve_address_lat_lng(&self, addr: &str) -> Option<MapPoint> {
        match self.search(addr).await {
            Ok(places) => places.first().and_then(Place::map_point),
            Err(err) => {
                log::warn!("Unable to geocode '{addr}': {err}");
                None
            }
        }
    }
}
