use async_trait::async_trait;
use thiserror::Error;

/// A stylesheet or script of the map library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
    /// Subresource integrity digest, e.g. `sha256-…`.
    pub integrity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to load {url}: {reason}")]
pub struct AssetError {
    pub url: String,
    pub reason: String,
}

/// The place where the map library gets loaded into, e.g. the document head.
#[async_trait(?Send)]
pub trait AssetHost {
    /// The map library can be used.
    fn is_ready(&self) -> bool;

    /// The assets have already been added by someone else,
    /// so loading them again would only duplicate them.
    fn is_loading(&self) -> bool;

    /// Resolves once the stylesheet has been loaded.
    async fn attach_stylesheet(&self, asset: &Asset) -> Result<(), AssetError>;

    /// Resolves once the script has been loaded and executed.
    async fn attach_script(&self, asset: &Asset) -> Result<(), AssetError>;
}
