use std::time::Duration;

use duration_str::{deserialize_duration, deserialize_option_duration};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = include_str!("pickup-info.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub endpoint: Option<Endpoint>,
    pub geocoding: Option<Geocoding>,
    pub assets: Option<Assets>,
    pub dialog: Option<Dialog>,
    pub map: Option<Map>,
    pub messages: Option<Messages>,
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Endpoint {
    pub base_url: String,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Config::default().endpoint.expect("Endpoint configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Geocoding {
    pub base_url: String,
    pub language: String,
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for Geocoding {
    fn default() -> Self {
        Config::default().geocoding.expect("Geocoding configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Assets {
    pub stylesheet_url: String,
    pub stylesheet_integrity: Option<String>,
    pub script_url: String,
    pub script_integrity: Option<String>,
    #[serde(deserialize_with = "deserialize_duration")]
    pub ready_timeout: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,
}

impl Default for Assets {
    fn default() -> Self {
        Config::default().assets.expect("Assets configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dialog {
    #[serde(deserialize_with = "deserialize_duration")]
    pub transition: Duration,
}

impl Default for Dialog {
    fn default() -> Self {
        Config::default().dialog.expect("Dialog configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Map {
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub max_zoom: u8,
    pub marker_class: String,
    /// e.g. `["300ms", "600ms"]`
    pub relayout_delays: Vec<String>,
    pub search_url: String,
}

impl Default for Map {
    fn default() -> Self {
        Config::default().map.expect("Map configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Messages {
    pub loading: Option<String>,
    pub load_failed: Option<String>,
    pub not_configured: Option<String>,
    pub map_unavailable: Option<String>,
    pub location_unknown: Option<String>,
    pub map_search: Option<String>,
}

impl Default for Messages {
    fn default() -> Self {
        Config::default().messages.expect("Messages configuration")
    }
}
