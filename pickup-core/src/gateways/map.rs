use std::rc::Rc;

use thiserror::Error;

use crate::entities::MapPoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    /// e.g. `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

/// Sizes and offsets in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    pub class_name: String,
    pub size: (u32, u32),
    pub anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub subtitle: String,
}

/// A marker with its popup opened.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub pos: MapPoint,
    pub icon: MarkerIcon,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MapError(pub String);

/// Creates maps on the map surface of the dialog.
pub trait MapLibrary {
    fn create_map(&self, center: MapPoint, zoom: u8) -> Result<Rc<dyn MapHandle>, MapError>;
}

pub trait MapHandle {
    fn add_tile_layer(&self, layer: &TileLayer);
    fn add_marker(&self, marker: &Marker);
    /// Recalculates the size after the surface has been resized.
    fn invalidate_size(&self);
    /// Destroys the map and its event handlers.
    fn remove(&self);
}
