use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;

use pickup_core::{
    entities::MapPoint,
    gateways::{MapError, MapHandle, MapLibrary, Marker, Region, TileLayer},
};

use crate::{document::region_id, leaflet};

const MARKER_HTML: &str =
    r#"<div class="pickup-map-marker"><i class="fa fa-map-marker"></i></div>"#;

fn map_error(err: &JsValue) -> MapError {
    MapError(format!("{err:?}"))
}

/// Draws into the map region of the dialog.
#[derive(Debug)]
pub struct LeafletMapLibrary {
    document: web_sys::Document,
}

impl LeafletMapLibrary {
    #[must_use]
    pub const fn new(document: web_sys::Document) -> Self {
        Self { document }
    }
}

impl MapLibrary for LeafletMapLibrary {
    fn create_map(&self, center: MapPoint, zoom: u8) -> Result<Rc<dyn MapHandle>, MapError> {
        if !leaflet::is_loaded() {
            return Err(MapError("Leaflet is not loaded".into()));
        }
        let container = self
            .document
            .get_element_by_id(region_id(Region::Map))
            .ok_or_else(|| MapError("No map container".into()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| MapError("Invalid map container".into()))?;
        let map = leaflet::map(&container).map_err(|err| map_error(&err))?;
        map.set_view(&lat_lng(center), zoom)
            .map_err(|err| map_error(&err))?;
        Ok(Rc::new(LeafletMap {
            document: self.document.clone(),
            map,
        }))
    }
}

fn lat_lng(pos: MapPoint) -> js_sys::Array {
    leaflet::pair(pos.lat().to_deg(), pos.lng().to_deg())
}

struct LeafletMap {
    document: web_sys::Document,
    map: leaflet::Map,
}

impl LeafletMap {
    fn try_add_tile_layer(&self, layer: &TileLayer) -> Result<(), JsValue> {
        let TileLayer {
            url_template,
            attribution,
            max_zoom,
        } = layer;
        let options = leaflet::options([
            ("attribution", JsValue::from_str(attribution)),
            ("maxZoom", JsValue::from(*max_zoom)),
        ])?;
        leaflet::tile_layer(url_template, &options)?.add_to(&self.map)?;
        Ok(())
    }

    fn try_add_marker(&self, marker: &Marker) -> Result<(), JsValue> {
        let Marker { pos, icon, popup } = marker;
        let icon = leaflet::div_icon(&leaflet::options([
            ("className", JsValue::from_str(&icon.class_name)),
            ("html", JsValue::from_str(MARKER_HTML)),
            ("iconSize", leaflet::pair(icon.size.0, icon.size.1).into()),
            ("iconAnchor", leaflet::pair(icon.anchor.0, icon.anchor.1).into()),
            (
                "popupAnchor",
                leaflet::pair(icon.popup_anchor.0, icon.popup_anchor.1).into(),
            ),
        ])?)?;
        let content = self.popup_content(&popup.title, &popup.subtitle)?;
        leaflet::marker(&lat_lng(*pos), &leaflet::options([("icon", icon.into())])?)?
            .add_to(&self.map)?
            .bind_popup(&content)?
            .open_popup()?;
        Ok(())
    }

    /// Built from text nodes, the values are not trusted markup.
    fn popup_content(&self, title: &str, subtitle: &str) -> Result<HtmlElement, JsValue> {
        let container = self.document.create_element("div")?;
        container.set_class_name("pickup-map-popup");
        let strong = self.document.create_element("strong")?;
        strong.set_text_content(Some(title));
        let small = self.document.create_element("small")?;
        small.set_text_content(Some(subtitle));
        container.append_child(&strong)?;
        let br = self.document.create_element("br")?;
        container.append_child(&br)?;
        container.append_child(&small)?;
        container.dyn_into().map_err(JsValue::from)
    }
}

impl MapHandle for LeafletMap {
    fn add_tile_layer(&self, layer: &TileLayer) {
        if let Err(err) = self.try_add_tile_layer(layer) {
            log::warn!("Unable to add tile layer: {err:?}");
        }
    }

    fn add_marker(&self, marker: &Marker) {
        if let Err(err) = self.try_add_marker(marker) {
            log::warn!("Unable to add marker: {err:?}");
        }
    }

    fn invalidate_size(&self) {
        if let Err(err) = self.map.invalidate_size() {
            log::debug!("Unable to invalidate map size: {err:?}");
        }
    }

    fn remove(&self) {
        if let Err(err) = self.map.remove() {
            log::debug!("Unable to remove map: {err:?}");
        }
    }
}
