//! Downloads the map library outside of a browser.

use std::{
    cell::{Cell, RefCell},
    time::Duration,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use sha2::{Digest as _, Sha256, Sha384, Sha512};
use thiserror::Error;

use pickup_core::gateways::{Asset, AssetError, AssetHost};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("digest mismatch ({0})")]
    Mismatch(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Algorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    fn digest(self, bytes: &[u8]) -> String {
        match self {
            Self::Sha256 => STANDARD.encode(Sha256::digest(bytes)),
            Self::Sha384 => STANDARD.encode(Sha384::digest(bytes)),
            Self::Sha512 => STANDARD.encode(Sha512::digest(bytes)),
        }
    }
}

/// Checks the bytes against Subresource Integrity metadata,
/// e.g. `sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY=`.
///
/// Only the strongest of the given algorithms is considered.
/// Metadata without any supported algorithm is accepted.
pub fn verify_integrity(metadata: &str, bytes: &[u8]) -> Result<(), IntegrityError> {
    let hashes: Vec<_> = metadata
        .split_whitespace()
        .filter_map(|token| {
            let (name, value) = token.split_once('-')?;
            let algorithm = Algorithm::parse(name)?;
            // Options like `?foo` are reserved and ignored
            let value = value.split('?').next().unwrap_or_default();
            Some((algorithm, value))
        })
        .collect();
    let Some(strongest) = hashes.iter().map(|(algorithm, _)| *algorithm).max() else {
        return Ok(());
    };
    let actual = strongest.digest(bytes);
    if hashes
        .iter()
        .any(|(algorithm, expected)| *algorithm == strongest && *expected == actual)
    {
        Ok(())
    } else {
        Err(IntegrityError::Mismatch(strongest.name()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    pub url: String,
    pub size: usize,
}

/// Fetches the assets and verifies their integrity.
///
/// The library counts as ready once the script has been loaded.
#[derive(Debug)]
pub struct HttpAssetHost {
    client: Client,
    loaded: RefCell<Vec<LoadedAsset>>,
    script_loaded: Cell<bool>,
}

impl HttpAssetHost {
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        Ok(Self {
            client: crate::http::client(crate::http::DEFAULT_USER_AGENT, timeout)?,
            loaded: RefCell::new(vec![]),
            script_loaded: Cell::new(false),
        })
    }

    #[must_use]
    pub fn loaded(&self) -> Vec<LoadedAsset> {
        self.loaded.borrow().clone()
    }

    async fn download(&self, asset: &Asset) -> Result<(), AssetError> {
        let error = |reason: String| AssetError {
            url: asset.url.clone(),
            reason,
        };
        let bytes = self
            .client
            .get(&asset.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| error(err.to_string()))?
            .bytes()
            .await
            .map_err(|err| error(err.to_string()))?;
        if let Some(integrity) = &asset.integrity {
            verify_integrity(integrity, &bytes).map_err(|err| error(err.to_string()))?;
        }
        log::debug!("Loaded {} ({} bytes)", asset.url, bytes.len());
        self.loaded.borrow_mut().push(LoadedAsset {
            url: asset.url.clone(),
            size: bytes.len(),
        });
        Ok(())
    }
}

#[async_trait(?Send)]
impl AssetHost for HttpAssetHost {
    fn is_ready(&self) -> bool {
        self.script_loaded.get()
    }

    fn is_loading(&self) -> bool {
        false
    }

    async fn attach_stylesheet(&self, asset: &Asset) -> Result<(), AssetError> {
        self.download(asset).await
    }

    async fn attach_script(&self, asset: &Asset) -> Result<(), AssetError> {
        self.download(asset).await?;
        self.script_loaded.set(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // echo -n "alert('Hello, world.');" | openssl dgst -sha384 -binary | openssl base64 -A
    const HELLO: &[u8] = b"alert('Hello, world.');";
    const HELLO_SHA384: &str = "sha384-H8BRh8j48O9oYatfu5AZzq6A9RINhZO5H16dQZngK7T62em8MUt1FLm52t+eX6xO";

    #[test]
    fn accept_matching_digest() {
        assert_eq!(verify_integrity(HELLO_SHA384, HELLO), Ok(()));
        let sha256 = format!("sha256-{}", STANDARD.encode(Sha256::digest(HELLO)));
        assert_eq!(verify_integrity(&sha256, HELLO), Ok(()));
    }

    #[test]
    fn reject_mismatching_digest() {
        assert_eq!(
            verify_integrity(HELLO_SHA384, b"alert('Hello, world!');"),
            Err(IntegrityError::Mismatch("sha384"))
        );
    }

    #[test]
    fn only_strongest_algorithm_counts() {
        let sha256 = format!("sha256-{}", STANDARD.encode(Sha256::digest(HELLO)));
        let metadata = format!("{sha256} sha512-invalid");
        assert_eq!(
            verify_integrity(&metadata, HELLO),
            Err(IntegrityError::Mismatch("sha512"))
        );
        let metadata = format!("md5-foo {sha256}");
        assert_eq!(verify_integrity(&metadata, HELLO), Ok(()));
    }

    #[test]
    fn ignore_unsupported_metadata() {
        assert_eq!(verify_integrity("", HELLO), Ok(()));
        assert_eq!(verify_integrity("md5-foo", HELLO), Ok(()));
    }
}
