use std::time::Duration;

use thiserror::Error;

use crate::{
    entities::{CarrierId, CarrierIdParseError},
    gateways::{AssetError, FetchError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(#[from] CarrierIdParseError),
    #[error("Unable to fetch pickup point: {0}")]
    FetchFailed(#[from] FetchError),
    #[error("No pickup point configured for carrier {0}")]
    NotConfigured(CarrierId),
    #[error("Superseded by a newer request")]
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Map library not ready after {0:?}")]
    Timeout(Duration),
    #[error("Unable to load map library: {0}")]
    Failed(String),
}

impl From<AssetError> for LoadError {
    fn from(err: AssetError) -> Self {
        Self::Failed(err.to_string())
    }
}
