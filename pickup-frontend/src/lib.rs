//! Browser host of the pickup point dialog.
//!
//! Attaches the widget to the checkout page once the module
//! has been loaded, e.g. by a bundle built with `wasm-pack`.

use std::{cell::RefCell, rc::Rc};

use wasm_bindgen::prelude::*;

use pickup_core::{PickupInfoWidget, Ports, Settings};

mod api;
mod assets;
mod document;
mod leaflet;
mod map;
mod runtime;

use self::{
    api::{Nominatim, PickupApi},
    assets::DomAssetHost,
    document::DomDocument,
    map::LeafletMapLibrary,
    runtime::BrowserRuntime,
};

/// Same origin as the checkout page.
const DEFAULT_API_URL: &str = "";
const DEFAULT_GEOCODING_LANGUAGE: &str = "es";

thread_local! {
    static WIDGET: RefCell<Option<Rc<PickupInfoWidget>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    _ = console_log::init_with_level(log::Level::Info);
    console_error_panic_hook::set_once();
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("No document"))?;
    let ports = Ports {
        document: Rc::new(DomDocument::new(document.clone())),
        runtime: Rc::new(BrowserRuntime),
        pickup_points: Rc::new(PickupApi::new(DEFAULT_API_URL)),
        geocoder: Rc::new(Nominatim::new(
            api::NOMINATIM_URL,
            DEFAULT_GEOCODING_LANGUAGE,
        )),
        assets: Rc::new(DomAssetHost::new(document.clone())),
        map_library: Rc::new(LeafletMapLibrary::new(document)),
    };
    let widget = PickupInfoWidget::new(ports, Settings::default());
    widget.attach();
    log::info!("Attached pickup point info");
    WIDGET.with(|w| *w.borrow_mut() = Some(widget));
    Ok(())
}

/// Removes all listeners and closes the dialog.
#[wasm_bindgen]
pub fn stop() {
    if let Some(widget) = WIDGET.with(|w| w.borrow_mut().take()) {
        widget.detach();
        log::info!("Detached pickup point info");
    }
}
