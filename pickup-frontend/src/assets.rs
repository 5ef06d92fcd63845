use std::{cell::RefCell, rc::Rc};

use async_trait::async_trait;
use futures::channel::oneshot;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::HtmlElement;

use pickup_core::gateways::{Asset, AssetError, AssetHost};

use crate::leaflet;

/// Scripts that have been added to the page by anyone.
const SCRIPT_SELECTOR: &str = r#"script[src*="leaflet"]"#;

/// Adds the map library to the `<head>` of the page.
#[derive(Debug)]
pub struct DomAssetHost {
    document: web_sys::Document,
}

impl DomAssetHost {
    #[must_use]
    pub const fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    fn has_stylesheet(&self, url: &str) -> bool {
        self.document
            .query_selector(&format!(r#"link[rel="stylesheet"][href="{url}"]"#))
            .ok()
            .flatten()
            .is_some()
    }

    fn create(&self, tag: &str, asset: &Asset) -> Result<HtmlElement, JsValue> {
        let el = self.document.create_element(tag)?;
        if let Some(integrity) = &asset.integrity {
            el.set_attribute("integrity", integrity)?;
            el.set_attribute("crossorigin", "")?;
        }
        el.dyn_into().map_err(JsValue::from)
    }

    async fn append(&self, el: HtmlElement, asset: &Asset) -> Result<(), AssetError> {
        let error = |reason: String| AssetError {
            url: asset.url.clone(),
            reason,
        };
        let head = self
            .document
            .head()
            .ok_or_else(|| error("Missing document head".into()))?;
        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let settle = move |result: Result<(), String>| {
            let tx = Rc::clone(&tx);
            move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    _ = tx.send(result);
                }
            }
        };
        let onload = Closure::once(settle(Ok(())));
        let onerror = Closure::once(settle(Err("Failed to load".into())));
        el.set_onload(Some(onload.as_ref().unchecked_ref()));
        el.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        head.append_child(&el)
            .map_err(|err| error(format!("{err:?}")))?;
        let result = rx.await.unwrap_or_else(|_| Err("Cancelled".into()));
        el.set_onload(None);
        el.set_onerror(None);
        if result.is_err() {
            // A failed element must not be mistaken for a pending load.
            el.remove();
        }
        result.map_err(error)
    }
}

#[async_trait(?Send)]
impl AssetHost for DomAssetHost {
    fn is_ready(&self) -> bool {
        leaflet::is_loaded()
    }

    fn is_loading(&self) -> bool {
        self.document
            .query_selector(SCRIPT_SELECTOR)
            .ok()
            .flatten()
            .is_some()
    }

    async fn attach_stylesheet(&self, asset: &Asset) -> Result<(), AssetError> {
        if self.has_stylesheet(&asset.url) {
            log::debug!("Stylesheet {} is already present", asset.url);
            return Ok(());
        }
        let link = self
            .create("link", asset)
            .and_then(|el| {
                el.set_attribute("rel", "stylesheet")?;
                el.set_attribute("href", &asset.url)?;
                Ok(el)
            })
            .map_err(|err| AssetError {
                url: asset.url.clone(),
                reason: format!("{err:?}"),
            })?;
        self.append(link, asset).await
    }

    async fn attach_script(&self, asset: &Asset) -> Result<(), AssetError> {
        let script = self
            .create("script", asset)
            .and_then(|el| {
                el.set_attribute("src", &asset.url)?;
                Ok(el)
            })
            .map_err(|err| AssetError {
                url: asset.url.clone(),
                reason: format!("{err:?}"),
            })?;
        self.append(script, asset).await
    }
}
