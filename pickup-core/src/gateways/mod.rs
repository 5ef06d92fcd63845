mod assets;
mod document;
mod geocode;
mod map;
mod pickup_point;
mod runtime;

pub use self::{assets::*, document::*, geocode::*, map::*, pickup_point::*, runtime::*};
