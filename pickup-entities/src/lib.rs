#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

//! # pickup-entities
//!
//! Reusable, agnostic domain entities for pickup point information.
//!
//! The entities only contain generic functionality that does not reveal any
//! checkout- or rendering-specific logic.

pub mod carrier;
pub mod geo;
pub mod pickup_point;

#[cfg(any(test, feature = "builders"))]
pub mod builders;
