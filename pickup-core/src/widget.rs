use std::{
    cell::Cell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    asset_loader::{AssetBundle, AssetLoader},
    dialog::{DialogController, DialogTiming},
    entities::{CarrierId, PickupPoint},
    gateways::{
        AssetHost, Document, EventHandler, GeoCodingGateway, ListenerId, ListenerTarget,
        MapLibrary, PickupPointGateway, Region, Runtime, UiEvent,
    },
    map_renderer::{MapOutcome, MapRenderer, MapStyle},
    messages::Messages,
    sequence::SequenceCounter,
    util::links::{mailto_href, map_search_url, tel_href},
    Error, Result,
};

/// Everything the widget talks to.
#[derive(Clone)]
pub struct Ports {
    pub document: Rc<dyn Document>,
    pub runtime: Rc<dyn Runtime>,
    pub pickup_points: Rc<dyn PickupPointGateway>,
    pub geocoder: Rc<dyn GeoCodingGateway>,
    pub assets: Rc<dyn AssetHost>,
    pub map_library: Rc<dyn MapLibrary>,
}

impl fmt::Debug for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub assets: AssetBundle,
    pub dialog: DialogTiming,
    pub map: MapStyle,
    pub messages: Messages,
}

/// The result of a trigger that has not been superseded.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub carrier: CarrierId,
    pub map: MapOutcome,
}

/// Shows the pickup point of a carrier when one of
/// the trigger elements is clicked.
pub struct PickupInfoWidget {
    me: Weak<Self>,
    document: Rc<dyn Document>,
    runtime: Rc<dyn Runtime>,
    pickup_points: Rc<dyn PickupPointGateway>,
    messages: Rc<Messages>,
    map_search_url: String,
    sequences: SequenceCounter,
    dialog: Rc<DialogController>,
    renderer: Rc<MapRenderer>,
    trigger_listener: Cell<Option<ListenerId>>,
}

impl fmt::Debug for PickupInfoWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickupInfoWidget")
            .field("dialog", &self.dialog)
            .field("renderer", &self.renderer)
            .field("trigger_listener", &self.trigger_listener.get())
            .finish_non_exhaustive()
    }
}

impl PickupInfoWidget {
    pub fn new(ports: Ports, settings: Settings) -> Rc<Self> {
        let Ports {
            document,
            runtime,
            pickup_points,
            geocoder,
            assets,
            map_library,
        } = ports;
        let Settings {
            assets: bundle,
            dialog: timing,
            map: style,
            messages,
        } = settings;
        let messages = Rc::new(messages);
        let map_search_url = style.map_search_url.clone();
        let sequences = SequenceCounter::new();
        let assets = AssetLoader::new(assets, Rc::clone(&runtime), bundle);
        let renderer = Rc::new(MapRenderer::new(
            Rc::clone(&document),
            map_library,
            assets,
            geocoder,
            Rc::clone(&runtime),
            style,
            Rc::clone(&messages),
        ));
        let dialog = DialogController::new(
            Rc::clone(&document),
            Rc::clone(&runtime),
            Rc::clone(&renderer),
            sequences.clone(),
            timing,
        );
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            document,
            runtime,
            pickup_points,
            messages,
            map_search_url,
            sequences,
            dialog,
            renderer,
            trigger_listener: Cell::new(None),
        })
    }

    #[must_use]
    pub fn dialog(&self) -> &Rc<DialogController> {
        &self.dialog
    }

    #[must_use]
    pub fn renderer(&self) -> &Rc<MapRenderer> {
        &self.renderer
    }

    #[must_use]
    pub fn sequences(&self) -> &SequenceCounter {
        &self.sequences
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.trigger_listener.get().is_some()
    }

    /// Starts listening for clicks on trigger elements.
    pub fn attach(&self) {
        if self.is_attached() {
            return;
        }
        let me = self.me.clone();
        let handler: EventHandler = Rc::new(move |event| {
            let UiEvent::Click { carrier_id } = event else {
                return;
            };
            let Some(this) = me.upgrade() else {
                return;
            };
            let carrier_id = carrier_id.clone();
            let runtime = Rc::clone(&this.runtime);
            runtime.spawn(Box::pin(async move {
                match this.handle_trigger(carrier_id.as_deref()).await {
                    Ok(Rendered { carrier, map }) => {
                        log::debug!("Showing pickup point of carrier {carrier}: {map:?}");
                    }
                    Err(Error::Superseded) => {}
                    Err(err) => log::debug!("{err}"),
                }
            }));
        });
        let id = self.document.add_listener(ListenerTarget::Trigger, handler);
        self.trigger_listener.set(Some(id));
    }

    /// Stops listening for triggers and closes the dialog.
    pub fn detach(&self) {
        if let Some(id) = self.trigger_listener.take() {
            self.document.remove_listener(id);
        }
        self.dialog.close();
    }

    pub fn close(&self) {
        self.dialog.close();
    }

    /// Opens the dialog and shows the pickup point of the carrier.
    ///
    /// A later trigger supersedes this one, as does closing the dialog.
    pub async fn handle_trigger(&self, carrier_id: Option<&str>) -> Result<Rendered> {
        let carrier = CarrierId::try_from(carrier_id).map_err(|err| {
            log::warn!("Ignoring trigger: {err}");
            Error::from(err)
        })?;
        let sequence = self.sequences.begin();
        log::debug!(
            "Loading pickup point of carrier {carrier} (sequence {})",
            sequence.id()
        );
        self.dialog.open();
        self.document
            .show_notice(Region::Loading, &self.messages.loading_notice());
        self.document.set_visible(Region::Loading, true);
        self.document.set_visible(Region::Content, false);

        let fetched = self.pickup_points.pickup_point(carrier).await;
        sequence.ensure_current()?;
        let point = match fetched {
            Ok(Some(point)) => point,
            Ok(None) => {
                log::info!("No pickup point configured for carrier {carrier}");
                self.document
                    .show_notice(Region::Loading, &self.messages.not_configured_notice());
                return Err(Error::NotConfigured(carrier));
            }
            Err(err) => {
                log::error!("Unable to load pickup point of carrier {carrier}: {err}");
                self.document
                    .show_notice(Region::Loading, &self.messages.load_failed_notice());
                return Err(err.into());
            }
        };

        self.populate(&point);
        self.document.set_visible(Region::Loading, false);
        self.document.set_visible(Region::Content, true);

        let map = self.renderer.render(&point, &sequence).await?;
        Ok(Rendered { carrier, map })
    }

    fn populate(&self, point: &PickupPoint) {
        let doc = &*self.document;
        doc.set_text(Region::CarrierName, &point.carrier_name);
        doc.set_text(Region::PartnerName, &point.partner_name);
        doc.set_text(Region::AddressLine1, &point.address_line1);
        doc.set_text(Region::AddressLine2, &point.address_line2);

        if let Some(url) = &point.image_url {
            doc.set_src(Region::PartnerImage, url);
        }
        doc.set_visible(Region::PartnerImage, point.image_url.is_some());

        if let Some(phone) = &point.phone {
            doc.set_text(Region::Phone, phone);
            doc.set_href(Region::Phone, &tel_href(phone));
        }
        doc.set_visible(Region::PhoneRow, point.phone.is_some());

        if let Some(email) = &point.email {
            doc.set_text(Region::Email, email);
            doc.set_href(Region::Email, &mailto_href(email));
        }
        doc.set_visible(Region::EmailRow, point.email.is_some());

        if let Some(hours) = &point.pickup_hours {
            doc.set_text(Region::Hours, hours);
        }
        doc.set_visible(Region::HoursCard, point.pickup_hours.is_some());
        doc.set_visible(Region::NoHoursCard, point.pickup_hours.is_none());

        let addr = point.address_query();
        if let Some(addr) = addr {
            doc.set_href(Region::MapLink, &map_search_url(&self.map_search_url, addr));
        }
        doc.set_visible(Region::MapLink, addr.is_some());
    }
}
