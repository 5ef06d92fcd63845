use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlElement, KeyboardEvent};

use pickup_core::gateways::{
    Document, EventHandler, ListenerId, ListenerTarget, Notice, NoticeKind, Region, UiEvent,
};

pub const DIALOG_ID: &str = "pickup-info-modal";

/// Elements that open the dialog, e.g. the info buttons of the delivery methods.
pub const TRIGGER_SELECTOR: &str = ".pickup-info-btn";
const CARRIER_ID_ATTRIBUTE: &str = "data-carrier-id";
const DISMISS_SELECTOR: &str = "[data-pickup-dismiss]";

const HIDDEN_CLASS: &str = "d-none";
const SHOWN_CLASS: &str = "show";
const MODAL_OPEN_CLASS: &str = "modal-open";
const OVERLAY_CLASS: &str = "modal-backdrop fade";

#[must_use]
pub const fn region_id(region: Region) -> &'static str {
    match region {
        Region::Loading => "pickup-info-loading",
        Region::Content => "pickup-info-content",
        Region::Map => "pickup-info-map",
        Region::CarrierName => "pickup-info-carrier-name",
        Region::PartnerName => "pickup-info-partner-name",
        Region::PartnerImage => "pickup-info-partner-image",
        Region::AddressLine1 => "pickup-info-address1",
        Region::AddressLine2 => "pickup-info-address2",
        Region::PhoneRow => "pickup-info-phone-row",
        Region::Phone => "pickup-info-phone",
        Region::EmailRow => "pickup-info-email-row",
        Region::Email => "pickup-info-email",
        Region::HoursCard => "pickup-info-hours-card",
        Region::Hours => "pickup-info-hours",
        Region::NoHoursCard => "pickup-info-no-hours-card",
        Region::MapLink => "pickup-info-map-link",
    }
}

const fn notice_class(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Loading | NoticeKind::Muted => "text-center py-4 text-muted",
        NoticeKind::Error => "text-center py-4 text-danger",
        NoticeKind::Warning => "text-center py-4 text-warning",
    }
}

type Callback = Closure<dyn FnMut(Event)>;

struct Listener {
    target: EventTarget,
    event_type: &'static str,
    callback: Callback,
}

/// The page with the dialog markup.
pub struct DomDocument {
    document: web_sys::Document,
    overlay: RefCell<Option<Element>>,
    listeners: RefCell<HashMap<ListenerId, Listener>>,
    next_listener_id: Cell<u64>,
}

impl DomDocument {
    #[must_use]
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            overlay: RefCell::new(None),
            listeners: RefCell::new(HashMap::new()),
            next_listener_id: Cell::new(1),
        }
    }

    fn element(&self, region: Region) -> Option<Element> {
        self.document.get_element_by_id(region_id(region))
    }

    fn dialog(&self) -> Option<Element> {
        self.document.get_element_by_id(DIALOG_ID)
    }

    fn notice_element(&self, notice: &Notice) -> Result<Element, JsValue> {
        let Notice {
            kind,
            message,
            link,
        } = notice;
        let container = self.document.create_element("div")?;
        container.set_class_name(notice_class(*kind));
        if *kind == NoticeKind::Loading {
            let spinner = self.document.create_element("div")?;
            spinner.set_class_name("spinner-border text-primary");
            spinner.set_attribute("role", "status")?;
            container.append_child(&spinner)?;
        }
        let paragraph = self.document.create_element("p")?;
        paragraph.set_class_name("mt-2");
        paragraph.set_text_content(Some(message));
        container.append_child(&paragraph)?;
        if let Some(link) = link {
            let anchor = self.document.create_element("a")?;
            anchor.set_class_name("btn btn-sm btn-outline-primary");
            anchor.set_attribute("href", &link.href)?;
            anchor.set_attribute("target", "_blank")?;
            anchor.set_attribute("rel", "noopener")?;
            anchor.set_text_content(Some(&link.label));
            container.append_child(&anchor)?;
        }
        Ok(container)
    }

    fn callback(
        &self,
        target: ListenerTarget,
        handler: EventHandler,
    ) -> (EventTarget, &'static str, Callback) {
        let document: EventTarget = self.document.clone().into();
        match target {
            ListenerTarget::Trigger => {
                let callback = Callback::new(move |ev: Event| {
                    let Some(trigger) = closest(&ev, TRIGGER_SELECTOR) else {
                        return;
                    };
                    ev.prevent_default();
                    ev.stop_propagation();
                    let carrier_id = trigger.get_attribute(CARRIER_ID_ATTRIBUTE);
                    handler(&UiEvent::Click { carrier_id });
                });
                (document, "click", callback)
            }
            ListenerTarget::Dismiss => {
                let callback = Callback::new(move |ev: Event| {
                    if closest(&ev, DISMISS_SELECTOR).is_some() {
                        ev.prevent_default();
                        handler(&UiEvent::Click { carrier_id: None });
                    }
                });
                (document, "click", callback)
            }
            ListenerTarget::Backdrop => {
                // The dialog element spans the whole viewport, its
                // content is nested. Only direct hits are outside.
                let callback = Callback::new(move |ev: Event| {
                    if ev.target().is_some() && ev.target() == ev.current_target() {
                        handler(&UiEvent::Click { carrier_id: None });
                    }
                });
                let target = self.dialog().map_or(document, Into::into);
                (target, "click", callback)
            }
            ListenerTarget::Keyboard => {
                let callback = Callback::new(move |ev: Event| {
                    if let Some(ev) = ev.dyn_ref::<KeyboardEvent>() {
                        handler(&UiEvent::KeyDown { key: ev.key() });
                    }
                });
                (document, "keydown", callback)
            }
        }
    }
}

fn closest(ev: &Event, selector: &str) -> Option<Element> {
    ev.target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

fn warn_on_error(action: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("Unable to {action}: {err:?}");
    }
}

impl Document for DomDocument {
    fn has_region(&self, region: Region) -> bool {
        self.element(region).is_some()
    }

    fn set_text(&self, region: Region, text: &str) {
        if let Some(el) = self.element(region) {
            el.set_text_content(Some(text));
        }
    }

    fn set_href(&self, region: Region, href: &str) {
        if let Some(el) = self.element(region) {
            warn_on_error("set href", el.set_attribute("href", href));
        }
    }

    fn set_src(&self, region: Region, src: &str) {
        if let Some(el) = self.element(region) {
            warn_on_error("set src", el.set_attribute("src", src));
        }
    }

    fn set_visible(&self, region: Region, visible: bool) {
        if let Some(el) = self.element(region) {
            let result = el.class_list().toggle_with_force(HIDDEN_CLASS, !visible);
            warn_on_error("toggle visibility", result.map(drop));
        }
    }

    fn show_notice(&self, region: Region, notice: &Notice) {
        let Some(el) = self.element(region) else {
            return;
        };
        let result = self.notice_element(notice).and_then(|notice| {
            el.set_text_content(None);
            el.append_child(&notice).map(drop)
        });
        warn_on_error("show notice", result);
    }

    fn clear(&self, region: Region) {
        if let Some(el) = self.element(region) {
            el.set_text_content(None);
        }
    }

    fn has_overlay(&self) -> bool {
        self.overlay.borrow().is_some()
    }

    fn create_overlay(&self) {
        let Some(body) = self.document.body() else {
            return;
        };
        let result = self.document.create_element("div").and_then(|overlay| {
            overlay.set_class_name(OVERLAY_CLASS);
            body.append_child(&overlay)?;
            *self.overlay.borrow_mut() = Some(overlay);
            Ok(())
        });
        warn_on_error("create overlay", result);
    }

    fn remove_overlay(&self) {
        if let Some(overlay) = self.overlay.borrow_mut().take() {
            overlay.remove();
        }
    }

    fn set_dialog_displayed(&self, displayed: bool) {
        let Some(dialog) = self.dialog().and_then(|el| el.dyn_into::<HtmlElement>().ok()) else {
            return;
        };
        let display = if displayed { "block" } else { "none" };
        warn_on_error(
            "display dialog",
            dialog.style().set_property("display", display),
        );
        if displayed {
            // Force a reflow so that adding the shown class is animated
            let _ = dialog.offset_height();
        }
        let aria = if displayed {
            dialog.remove_attribute("aria-hidden")
        } else {
            dialog.set_attribute("aria-hidden", "true")
        };
        warn_on_error("update dialog attributes", aria);
    }

    fn set_dialog_shown(&self, shown: bool) {
        let overlay = self.overlay.borrow().clone();
        for el in self.dialog().into_iter().chain(overlay) {
            let result = el.class_list().toggle_with_force(SHOWN_CLASS, shown);
            warn_on_error("toggle transition", result.map(drop));
        }
    }

    fn set_modal_open(&self, open: bool) {
        if let Some(body) = self.document.body() {
            let result = body.class_list().toggle_with_force(MODAL_OPEN_CLASS, open);
            warn_on_error("toggle modal state", result.map(drop));
        }
    }

    fn add_listener(&self, target: ListenerTarget, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0 + 1);
        let (target, event_type, callback) = self.callback(target, handler);
        warn_on_error(
            "add event listener",
            target.add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref()),
        );
        self.listeners.borrow_mut().insert(
            id,
            Listener {
                target,
                event_type,
                callback,
            },
        );
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let listener = self.listeners.borrow_mut().remove(&id);
        let Some(Listener {
            target,
            event_type,
            callback,
        }) = listener
        else {
            return;
        };
        warn_on_error(
            "remove event listener",
            target.remove_event_listener_with_callback(
                event_type,
                callback.as_ref().unchecked_ref(),
            ),
        );
    }
}
