//! # pickup-gateways
//!
//! HTTP implementations of the ports of `pickup-core`.

pub mod assets;
pub mod nominatim;
pub mod pickup_api;

mod http;
