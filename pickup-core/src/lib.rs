//! # pickup-core
//!
//! Shows the contact and location details of a pickup point in a dialog:
//! opening and closing the dialog, fetching the details, drawing the map.
//!
//! Everything the components talk to (the page, the map library,
//! the network) is reached through the ports in [`gateways`].

pub mod asset_loader;
pub mod dialog;
mod error;
pub mod gateways;
pub mod map_renderer;
pub mod messages;
pub mod sequence;
pub mod util;
pub mod widget;

#[cfg(any(test, feature = "headless"))]
pub mod headless;

#[cfg(test)]
mod tests;

pub mod entities {
    pub use pickup_entities::{carrier::*, geo::*, pickup_point::*};
}

pub use self::{
    error::{Error, LoadError},
    widget::*,
};

pub type Result<T> = std::result::Result<T, Error>;
