use anyhow::{anyhow, Result};
use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use pickup_core::{
    asset_loader::AssetBundle,
    dialog::DialogTiming,
    gateways::{Asset, MarkerIcon, TileLayer},
    map_renderer::MapStyle,
    messages::Messages,
    Settings,
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "pickup-info.toml";

const ENV_NAME_BASE_URL: &str = "PICKUP_INFO_BASE_URL";

pub struct Config {
    pub endpoint: Endpoint,
    pub geocoding: Geocoding,
    pub widget: Settings,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: PathBuf = file_path
            .as_ref()
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(|| {
                log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
                PathBuf::from(DEFAULT_CONFIG_FILE_NAME)
            });

        let raw_config = match fs::read_to_string(&file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration.",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(base_url) = env::var(ENV_NAME_BASE_URL) {
            cfg.endpoint.base_url = base_url;
        }
        Ok(cfg)
    }
}

pub struct Endpoint {
    /// The shop that serves the pickup point details.
    pub base_url: String,
    pub timeout: Option<Duration>,
}

pub struct Geocoding {
    pub base_url: String,
    pub language: String,
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            endpoint,
            geocoding,
            assets,
            dialog,
            map,
            messages,
        } = from;

        let raw::Endpoint { base_url, timeout } = endpoint.unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(anyhow!("No endpoint base URL defined"));
        }
        let endpoint = Endpoint { base_url, timeout };

        let raw::Geocoding {
            base_url,
            language,
            user_agent,
            timeout,
        } = geocoding.unwrap_or_default();
        let geocoding = Geocoding {
            base_url,
            language,
            user_agent: user_agent.filter(|s| !s.trim().is_empty()),
            timeout,
        };

        let raw::Assets {
            stylesheet_url,
            stylesheet_integrity,
            script_url,
            script_integrity,
            ready_timeout,
            poll_interval,
        } = assets.unwrap_or_default();
        if poll_interval.is_zero() {
            return Err(anyhow!("The asset poll interval must not be zero"));
        }
        let assets = AssetBundle {
            stylesheet: Asset {
                url: stylesheet_url,
                integrity: stylesheet_integrity,
            },
            script: Asset {
                url: script_url,
                integrity: script_integrity,
            },
            ready_timeout,
            poll_interval,
        };

        let raw::Dialog { transition } = dialog.unwrap_or_default();
        let dialog = DialogTiming { transition };

        let raw::Map {
            zoom,
            tile_url,
            attribution,
            max_zoom,
            marker_class,
            relayout_delays,
            search_url,
        } = map.unwrap_or_default();
        if zoom > max_zoom {
            return Err(anyhow!("Map zoom {zoom} exceeds max. zoom {max_zoom}"));
        }
        let relayout_delays = relayout_delays
            .iter()
            .map(|d| duration_str::parse(d).map_err(|err| anyhow!("Invalid relayout delay: {err}")))
            .collect::<Result<Vec<_>>>()?;
        let defaults = MapStyle::default();
        let map = MapStyle {
            zoom,
            tile_layer: TileLayer {
                url_template: tile_url,
                attribution,
                max_zoom,
            },
            marker_icon: MarkerIcon {
                class_name: marker_class,
                ..defaults.marker_icon
            },
            relayout_delays,
            map_search_url: search_url,
        };

        let raw::Messages {
            loading,
            load_failed,
            not_configured,
            map_unavailable,
            location_unknown,
            map_search,
        } = messages.unwrap_or_default();
        let defaults = Messages::default();
        let messages = Messages {
            loading: loading.unwrap_or(defaults.loading),
            load_failed: load_failed.unwrap_or(defaults.load_failed),
            not_configured: not_configured.unwrap_or(defaults.not_configured),
            map_unavailable: map_unavailable.unwrap_or(defaults.map_unavailable),
            location_unknown: location_unknown.unwrap_or(defaults.location_unknown),
            map_search: map_search.unwrap_or(defaults.map_search),
        };

        Ok(Self {
            endpoint,
            geocoding,
            widget: Settings {
                assets,
                dialog,
                map,
                messages,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_default_config() {
        let cfg = Config::try_from(raw::Config::default()).unwrap();
        assert_eq!(cfg.endpoint.base_url, "http://localhost:8069");
        assert_eq!(cfg.geocoding.language, "es");
        assert!(cfg.geocoding.user_agent.is_none());
    }

    #[test]
    fn default_config_matches_default_settings() {
        let cfg = Config::try_from(raw::Config::default()).unwrap();
        assert_eq!(cfg.widget, Settings::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let raw_config: raw::Config = toml::from_str(
            r#"
            [messages]
            loading = "Loading..."
            "#,
        )
        .unwrap();
        let cfg = Config::try_from(raw_config).unwrap();
        assert_eq!(cfg.widget.messages.loading, "Loading...");
        assert_eq!(
            cfg.widget.messages.load_failed,
            Messages::default().load_failed
        );
        assert_eq!(cfg.widget.map, MapStyle::default());
    }

    #[test]
    fn reject_invalid_relayout_delay() {
        let mut raw_config = raw::Config::default();
        raw_config.map.as_mut().unwrap().relayout_delays = vec!["soon".into()];
        assert!(Config::try_from(raw_config).is_err());
    }

    #[test]
    fn reject_zoom_beyond_max_zoom() {
        let mut raw_config = raw::Config::default();
        raw_config.map.as_mut().unwrap().zoom = 20;
        assert!(Config::try_from(raw_config).is_err());
    }

    #[test]
    fn load_default_config_if_file_is_missing() {
        let cfg =
            Config::try_load_from_file_or_default(Some("does-not-exist/pickup-info.toml")).unwrap();
        assert_eq!(cfg.widget.dialog, DialogTiming::default());
    }
}
