//! Bindings of the parts of [Leaflet](https://leafletjs.com/reference.html)
//! that are needed to show a single marker.
//!
//! `L` is only defined after the script has been loaded.
//! All calls are fallible for this reason.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen]
extern "C" {
    pub type Map;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    pub fn map(element: &HtmlElement) -> Result<Map, JsValue>;

    #[wasm_bindgen(catch, method, js_name = setView)]
    pub fn set_view(this: &Map, center: &Array, zoom: u8) -> Result<Map, JsValue>;

    #[wasm_bindgen(catch, method, js_name = invalidateSize)]
    pub fn invalidate_size(this: &Map) -> Result<Map, JsValue>;

    #[wasm_bindgen(catch, method)]
    pub fn remove(this: &Map) -> Result<Map, JsValue>;

    pub type TileLayer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &Object) -> Result<TileLayer, JsValue>;

    #[wasm_bindgen(catch, method, js_name = addTo)]
    pub fn add_to(this: &TileLayer, map: &Map) -> Result<TileLayer, JsValue>;

    pub type DivIcon;

    #[wasm_bindgen(catch, js_namespace = L, js_name = divIcon)]
    pub fn div_icon(options: &Object) -> Result<DivIcon, JsValue>;

    pub type Marker;

    #[wasm_bindgen(catch, js_namespace = L, js_name = marker)]
    pub fn marker(lat_lng: &Array, options: &Object) -> Result<Marker, JsValue>;

    #[wasm_bindgen(catch, method, js_name = addTo)]
    pub fn add_to(this: &Marker, map: &Map) -> Result<Marker, JsValue>;

    #[wasm_bindgen(catch, method, js_name = bindPopup)]
    pub fn bind_popup(this: &Marker, content: &HtmlElement) -> Result<Marker, JsValue>;

    #[wasm_bindgen(catch, method, js_name = openPopup)]
    pub fn open_popup(this: &Marker) -> Result<Marker, JsValue>;
}

/// Whether the global `L` object is available.
#[must_use]
pub fn is_loaded() -> bool {
    Reflect::get(&js_sys::global(), &JsValue::from_str("L")).is_ok_and(|l| l.is_object())
}

/// `[lat, lng]`, `[x, y]` or `[width, height]`
pub fn pair(a: impl Into<JsValue>, b: impl Into<JsValue>) -> Array {
    Array::of2(&a.into(), &b.into())
}

/// Creates an options object.
pub fn options<'a>(
    entries: impl IntoIterator<Item = (&'a str, JsValue)>,
) -> Result<Object, JsValue> {
    let options = Object::new();
    for (key, value) in entries {
        Reflect::set(&options, &JsValue::from_str(key), &value)?;
    }
    Ok(options)
}
