use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT_LANGUAGE, Client};
use serde::Deserialize;

use pickup_core::gateways::GeoCodingGateway;
use pickup_entities::geo::MapPoint;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_LANGUAGE: &str = "es";

/// A single search result.
///
/// Coordinates are sent as strings.
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

/// Geocoding with the [Nominatim](https://nominatim.org/) search API.
#[derive(Debug)]
pub struct Nominatim {
    client: Client,
    base_url: String,
    language: String,
}

impl Nominatim {
    /// The usage policy of the public instance requires a
    /// `user_agent` that identifies the application.
    pub fn new(
        base_url: &str,
        language: &str,
        user_agent: Option<&str>,
        timeout: Option<Duration>,
    ) -> reqwest::Result<Self> {
        let user_agent = user_agent.unwrap_or(crate::http::DEFAULT_USER_AGENT);
        Ok(Self {
            client: crate::http::client(user_agent, timeout)?,
            base_url: crate::http::trim_base_url(base_url),
            language: language.to_owned(),
        })
    }

    async fn search(&self, addr: &str) -> reqwest::Result<Vec<Place>> {
        self.client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", addr), ("format", "json"), ("limit", "1")])
            .header(ACCEPT_LANGUAGE, &self.language)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait(?Send)]
impl GeoCodingGateway for Nominatim {
    async fn resolve_address_lat_lng(&self, addr: &str) -> Option<MapPoint> {
        let places = match self.search(addr).await {
            Ok(places) => places,
            Err(err) => {
                log::warn!("Unable to geocode {addr:?}: {err}");
                return None;
            }
        };
        let Some(place) = places.first() else {
            log::debug!("No results for {addr:?}");
            return None;
        };
        let pos = place.map_point();
        if pos.is_none() {
            log::warn!("Invalid coordinates for {addr:?}: {place:?}");
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_string_coordinates() {
        let place = Place {
            lat: "40.4167047".into(),
            lon: " -3.7035825 ".into(),
        };
        let pos = place.map_point().unwrap();
        assert_eq!(pos.lat().to_deg(), 40.4167047);
        assert_eq!(pos.lng().to_deg(), -3.7035825);
    }

    #[test]
    fn reject_invalid_coordinates() {
        for (lat, lon) in [("", "1.0"), ("abc", "1.0"), ("91.0", "1.0"), ("1.0", "NaN")] {
            let place = Place {
                lat: lat.into(),
                lon: lon.into(),
            };
            assert!(place.map_point().is_none(), "{lat} {lon}");
        }
    }
}
