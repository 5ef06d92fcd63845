use std::{cell::RefCell, fmt, rc::Rc, time::Duration};

use crate::{
    asset_loader::AssetLoader,
    entities::{MapPoint, PickupPoint},
    gateways::{
        Document, GeoCodingGateway, MapError, MapHandle, MapLibrary, Marker, MarkerIcon, Popup,
        Region, Runtime, TileLayer,
    },
    messages::Messages,
    sequence::Sequence,
    util::links::map_search_url,
    LoadError, Result,
};

pub const GOOGLE_MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapStyle {
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub marker_icon: MarkerIcon,
    /// The map surface may still be resizing when the map is created.
    pub relayout_delays: Vec<Duration>,
    /// The encoded address gets appended.
    pub map_search_url: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            zoom: 16,
            tile_layer: TileLayer {
                url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
                attribution: "© <a href=\"https://www.openstreetmap.org/copyright\">OSM</a>"
                    .into(),
                max_zoom: 19,
            },
            marker_icon: MarkerIcon {
                class_name: "pickup-map-marker-icon".into(),
                size: (40, 40),
                anchor: (20, 40),
                popup_anchor: (0, -42),
            },
            relayout_delays: vec![Duration::from_millis(300), Duration::from_millis(600)],
            map_search_url: GOOGLE_MAPS_SEARCH_URL.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    Stored,
    Geocoded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    Drawn {
        pos: MapPoint,
        source: CoordinateSource,
    },
    /// Neither stored nor geocoded coordinates.
    LocationUnknown,
    Unavailable(LoadError),
    Failed(MapError),
    /// The page has no map surface.
    NoSurface,
}

type MapSlot = Rc<RefCell<Option<Rc<dyn MapHandle>>>>;

/// Draws at most one map at a time.
pub struct MapRenderer {
    document: Rc<dyn Document>,
    library: Rc<dyn MapLibrary>,
    assets: AssetLoader,
    geocoder: Rc<dyn GeoCodingGateway>,
    runtime: Rc<dyn Runtime>,
    style: MapStyle,
    messages: Rc<Messages>,
    current: MapSlot,
}

impl fmt::Debug for MapRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapRenderer")
            .field("assets", &self.assets)
            .field("style", &self.style)
            .field("has_map", &self.has_map())
            .finish_non_exhaustive()
    }
}

impl MapRenderer {
    pub fn new(
        document: Rc<dyn Document>,
        library: Rc<dyn MapLibrary>,
        assets: AssetLoader,
        geocoder: Rc<dyn GeoCodingGateway>,
        runtime: Rc<dyn Runtime>,
        style: MapStyle,
        messages: Rc<Messages>,
    ) -> Self {
        Self {
            document,
            library,
            assets,
            geocoder,
            runtime,
            style,
            messages,
            current: Rc::new(RefCell::new(None)),
        }
    }

    #[must_use]
    pub fn has_map(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Removes the current map, if any.
    pub fn dispose(&self) {
        let map = self.current.borrow_mut().take();
        if let Some(map) = map {
            log::debug!("Removing map");
            map.remove();
        }
    }

    /// Draws the map of the pickup point.
    ///
    /// Only fails if the sequence has been superseded while waiting,
    /// everything else ends with a notice on the map surface.
    pub async fn render(&self, point: &PickupPoint, sequence: &Sequence) -> Result<MapOutcome> {
        if !self.document.has_region(Region::Map) {
            log::debug!("No map surface available");
            return Ok(MapOutcome::NoSurface);
        }
        let loaded = self.assets.ensure_ready().await;
        sequence.ensure_current()?;
        self.dispose();
        if let Err(err) = loaded {
            self.document
                .show_notice(Region::Map, &self.messages.map_unavailable_notice());
            return Ok(MapOutcome::Unavailable(err));
        }
        self.document.clear(Region::Map);

        let Some((pos, source)) = self.resolve_pos(point, sequence).await? else {
            log::info!(
                "Unable to locate pickup point of {} on the map",
                point.carrier_name
            );
            let query = point.address_query().unwrap_or_default();
            let href = map_search_url(&self.style.map_search_url, query);
            self.document
                .show_notice(Region::Map, &self.messages.location_unknown_notice(href));
            return Ok(MapOutcome::LocationUnknown);
        };

        match self.draw(point, pos) {
            Ok(()) => Ok(MapOutcome::Drawn { pos, source }),
            Err(err) => {
                log::warn!("Unable to create map: {err}");
                self.document
                    .show_notice(Region::Map, &self.messages.map_unavailable_notice());
                Ok(MapOutcome::Failed(err))
            }
        }
    }

    async fn resolve_pos(
        &self,
        point: &PickupPoint,
        sequence: &Sequence,
    ) -> Result<Option<(MapPoint, CoordinateSource)>> {
        if let Some(pos) = point.known_pos() {
            return Ok(Some((pos, CoordinateSource::Stored)));
        }
        let Some(addr) = point.address_query() else {
            return Ok(None);
        };
        log::debug!("Geocoding {addr:?}");
        let pos = self.geocoder.resolve_address_lat_lng(addr).await;
        sequence.ensure_current()?;
        Ok(pos.map(|pos| (pos, CoordinateSource::Geocoded)))
    }

    fn draw(&self, point: &PickupPoint, pos: MapPoint) -> std::result::Result<(), MapError> {
        let map = self.library.create_map(pos, self.style.zoom)?;
        map.add_tile_layer(&self.style.tile_layer);
        map.add_marker(&Marker {
            pos,
            icon: self.style.marker_icon.clone(),
            popup: Popup {
                title: point.partner_name.clone(),
                subtitle: point.address_line1.clone(),
            },
        });
        for delay in &self.style.relayout_delays {
            let slot = Rc::downgrade(&self.current);
            let handle = Rc::downgrade(&map);
            self.runtime.schedule(
                *delay,
                Box::new(move || {
                    let (Some(slot), Some(handle)) = (slot.upgrade(), handle.upgrade()) else {
                        return;
                    };
                    let is_live = slot
                        .borrow()
                        .as_ref()
                        .is_some_and(|live| Rc::ptr_eq(live, &handle));
                    if is_live {
                        handle.invalidate_size();
                    }
                }),
            );
        }
        *self.current.borrow_mut() = Some(map);
        Ok(())
    }
}
