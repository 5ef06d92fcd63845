//! In-memory implementations of the page and the map library.
//!
//! Used for previews outside of a browser and for testing.

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use crate::{
    entities::MapPoint,
    gateways::{
        Document, EventHandler, ListenerId, ListenerTarget, MapError, MapHandle, MapLibrary,
        Marker, Notice, Region, TileLayer, UiEvent,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionState {
    pub text: String,
    pub href: Option<String>,
    pub src: Option<String>,
    pub visible: bool,
    pub notice: Option<Notice>,
}

impl Default for RegionState {
    fn default() -> Self {
        Self {
            text: String::new(),
            href: None,
            src: None,
            visible: true,
            notice: None,
        }
    }
}

#[derive(Default)]
struct PageState {
    regions: BTreeMap<Region, RegionState>,
    overlays: usize,
    dialog_displayed: bool,
    dialog_shown: bool,
    modal_open: bool,
    listeners: BTreeMap<ListenerId, (ListenerTarget, EventHandler)>,
    next_listener_id: u64,
}

pub struct HeadlessDocument {
    state: RefCell<PageState>,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::with_regions(Region::ALL)
    }
}

impl fmt::Debug for HeadlessDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessDocument")
            .field("regions", &state.regions)
            .field("overlays", &state.overlays)
            .field("dialog_displayed", &state.dialog_displayed)
            .field("dialog_shown", &state.dialog_shown)
            .field("modal_open", &state.modal_open)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl HeadlessDocument {
    pub fn with_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        let regions = regions
            .into_iter()
            .map(|region| (region, RegionState::default()))
            .collect();
        Self {
            state: RefCell::new(PageState {
                regions,
                ..Default::default()
            }),
        }
    }

    fn update(&self, region: Region, f: impl FnOnce(&mut RegionState)) {
        if let Some(state) = self.state.borrow_mut().regions.get_mut(&region) {
            f(state);
        }
    }

    #[must_use]
    pub fn region(&self, region: Region) -> Option<RegionState> {
        self.state.borrow().regions.get(&region).cloned()
    }

    #[must_use]
    pub fn text(&self, region: Region) -> Option<String> {
        self.region(region).map(|r| r.text)
    }

    #[must_use]
    pub fn href(&self, region: Region) -> Option<String> {
        self.region(region).and_then(|r| r.href)
    }

    #[must_use]
    pub fn src(&self, region: Region) -> Option<String> {
        self.region(region).and_then(|r| r.src)
    }

    #[must_use]
    pub fn notice(&self, region: Region) -> Option<Notice> {
        self.region(region).and_then(|r| r.notice)
    }

    #[must_use]
    pub fn is_visible(&self, region: Region) -> bool {
        self.region(region).is_some_and(|r| r.visible)
    }

    #[must_use]
    pub fn overlays(&self) -> usize {
        self.state.borrow().overlays
    }

    #[must_use]
    pub fn dialog_displayed(&self) -> bool {
        self.state.borrow().dialog_displayed
    }

    #[must_use]
    pub fn dialog_shown(&self) -> bool {
        self.state.borrow().dialog_shown
    }

    #[must_use]
    pub fn modal_open(&self) -> bool {
        self.state.borrow().modal_open
    }

    #[must_use]
    pub fn listener_count(&self, target: ListenerTarget) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|(t, _)| *t == target)
            .count()
    }

    /// Invokes all listeners of the target in the order of registration.
    pub fn dispatch(&self, target: ListenerTarget, event: &UiEvent) {
        let handlers: Vec<_> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(_, (t, _))| *t == target)
            .map(|(id, (_, handler))| (*id, Rc::clone(handler)))
            .collect();
        for (id, handler) in handlers {
            // Might have been removed by a previous handler
            if !self.state.borrow().listeners.contains_key(&id) {
                continue;
            }
            handler(event);
        }
    }
}

impl Document for HeadlessDocument {
    fn has_region(&self, region: Region) -> bool {
        self.state.borrow().regions.contains_key(&region)
    }

    fn set_text(&self, region: Region, text: &str) {
        self.update(region, |r| {
            r.text = text.to_owned();
            r.notice = None;
        });
    }

    fn set_href(&self, region: Region, href: &str) {
        self.update(region, |r| r.href = Some(href.to_owned()));
    }

    fn set_src(&self, region: Region, src: &str) {
        self.update(region, |r| r.src = Some(src.to_owned()));
    }

    fn set_visible(&self, region: Region, visible: bool) {
        self.update(region, |r| r.visible = visible);
    }

    fn show_notice(&self, region: Region, notice: &Notice) {
        self.update(region, |r| {
            r.text.clear();
            r.notice = Some(notice.clone());
        });
    }

    fn clear(&self, region: Region) {
        self.update(region, |r| {
            r.text.clear();
            r.notice = None;
        });
    }

    fn has_overlay(&self) -> bool {
        self.state.borrow().overlays > 0
    }

    fn create_overlay(&self) {
        self.state.borrow_mut().overlays += 1;
    }

    fn remove_overlay(&self) {
        let mut state = self.state.borrow_mut();
        state.overlays = state.overlays.saturating_sub(1);
    }

    fn set_dialog_displayed(&self, displayed: bool) {
        self.state.borrow_mut().dialog_displayed = displayed;
    }

    fn set_dialog_shown(&self, shown: bool) {
        self.state.borrow_mut().dialog_shown = shown;
    }

    fn set_modal_open(&self, open: bool) {
        self.state.borrow_mut().modal_open = open;
    }

    fn add_listener(&self, target: ListenerTarget, handler: EventHandler) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_listener_id += 1;
        let id = ListenerId(state.next_listener_id);
        state.listeners.insert(id, (target, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.state.borrow_mut().listeners.remove(&id);
    }
}

impl fmt::Display for HeadlessDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        writeln!(
            f,
            "dialog: {}, {}, overlays: {}, listeners: {}",
            if state.dialog_shown { "shown" } else { "hidden" },
            if state.modal_open { "modal" } else { "not modal" },
            state.overlays,
            state.listeners.len()
        )?;
        for (region, r) in &state.regions {
            if !r.visible {
                writeln!(f, "  {region:?}: -")?;
                continue;
            }
            write!(f, "  {region:?}:")?;
            if !r.text.is_empty() {
                write!(f, " {:?}", r.text)?;
            }
            if let Some(href) = &r.href {
                write!(f, " <{href}>")?;
            }
            if let Some(src) = &r.src {
                write!(f, " [{src}]")?;
            }
            if let Some(notice) = &r.notice {
                write!(f, " ({:?}) {}", notice.kind, notice.message)?;
                if let Some(link) = &notice.link {
                    write!(f, " {} <{}>", link.label, link.href)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub center: MapPoint,
    pub zoom: u8,
    pub tile_layers: Vec<TileLayer>,
    pub markers: Vec<Marker>,
    pub relayouts: usize,
    pub removed: bool,
}

impl fmt::Display for MapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map at {} (zoom {})", self.center, self.zoom)?;
        if self.removed {
            write!(f, " removed")?;
        }
        for marker in &self.markers {
            write!(
                f,
                "\n  marker at {}: {} / {}",
                marker.pos, marker.popup.title, marker.popup.subtitle
            )?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct HeadlessMap {
    state: RefCell<MapState>,
}

impl MapHandle for HeadlessMap {
    fn add_tile_layer(&self, layer: &TileLayer) {
        self.state.borrow_mut().tile_layers.push(layer.clone());
    }

    fn add_marker(&self, marker: &Marker) {
        self.state.borrow_mut().markers.push(marker.clone());
    }

    fn invalidate_size(&self) {
        let mut state = self.state.borrow_mut();
        if !state.removed {
            state.relayouts += 1;
        }
    }

    fn remove(&self) {
        self.state.borrow_mut().removed = true;
    }
}

/// Records all maps that have been created.
#[derive(Debug, Default)]
pub struct HeadlessMapLibrary {
    maps: RefCell<Vec<Rc<HeadlessMap>>>,
}

impl HeadlessMapLibrary {
    #[must_use]
    pub fn maps(&self) -> Vec<MapState> {
        self.maps
            .borrow()
            .iter()
            .map(|map| map.state.borrow().clone())
            .collect()
    }

    /// Number of maps that have not been removed.
    #[must_use]
    pub fn live_maps(&self) -> usize {
        self.maps
            .borrow()
            .iter()
            .filter(|map| !map.state.borrow().removed)
            .count()
    }
}

impl MapLibrary for HeadlessMapLibrary {
    fn create_map(&self, center: MapPoint, zoom: u8) -> Result<Rc<dyn MapHandle>, MapError> {
        let map = Rc::new(HeadlessMap {
            state: RefCell::new(MapState {
                center,
                zoom,
                tile_layers: vec![],
                markers: vec![],
                relayouts: 0,
                removed: false,
            }),
        });
        self.maps.borrow_mut().push(Rc::clone(&map));
        Ok(map)
    }
}
