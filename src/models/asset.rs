//! CDN assets (avatars, icons, sticker banners).

use crate::error::Error;

#[cfg(feature = "http")]
use crate::http::Http;
#[cfg(feature = "http")]
use std::path::Path;

/// The CDN address for assets.
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Hash prefix marking an animated asset.
const ANIMATED_PREFIX: &str = "a_";

/// A Discord CDN asset.
///
/// Holds the asset URL (without extension or size) plus the hash it was
/// built from, if known. Fetching appends an explicit or default extension;
/// animated hashes default to `.gif`, everything else to `.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// URL of this asset, without extension.
    pub url: String,
    /// The asset hash, if this asset was built from one.
    pub hash: Option<String>,
}

impl Asset {
    /// An asset for a URL with no known hash.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hash: None,
        }
    }

    /// Build an asset by substituting `hash` into a CDN path template.
    ///
    /// The template's `{}` placeholder is replaced by the hash:
    ///
    /// ```ignore
    /// let icon = Asset::from_path_hash("icons/41771983423143937/{}", "a_1234");
    /// assert!(icon.animated());
    /// ```
    pub fn from_path_hash(path: &str, hash: &str) -> Self {
        Self {
            url: format!("{CDN_BASE}/{}", path.replacen("{}", hash, 1)),
            hash: Some(hash.to_owned()),
        }
    }

    /// Whether this asset is animated (its hash carries the `a_` prefix).
    pub fn animated(&self) -> bool {
        self.hash
            .as_deref()
            .is_some_and(|hash| hash.starts_with(ANIMATED_PREFIX))
    }

    /// The full request URL for this asset.
    ///
    /// `size`, when given, must be a power of two in `[16, 4096]` and is
    /// appended as a query string ahead of the extension. `extension`
    /// defaults to `.gif` for animated assets and `.png` otherwise.
    pub fn request_url(
        &self,
        extension: Option<&str>,
        size: Option<u32>,
    ) -> Result<String, Error> {
        let extension = match extension {
            Some(ext) => ext,
            None if self.animated() => ".gif",
            None => ".png",
        };

        let mut url = self.url.clone();
        if let Some(size) = size {
            validate_size(size)?;
            url = format!("{url}?size={size}");
        }

        Ok(format!("{url}{extension}"))
    }

    /// Fetch the raw bytes of this asset from the CDN.
    #[cfg(feature = "http")]
    pub async fn get(
        &self,
        http: &Http,
        extension: Option<&str>,
        size: Option<u32>,
    ) -> Result<Vec<u8>, Error> {
        let url = self.request_url(extension, size)?;
        http.request_cdn(&url).await
    }

    /// Fetch this asset and write it to `path`, returning the byte count.
    #[cfg(feature = "http")]
    pub async fn save(
        &self,
        http: &Http,
        path: impl AsRef<Path>,
        extension: Option<&str>,
        size: Option<u32>,
    ) -> Result<usize, Error> {
        let bytes = self.get(http, extension, size).await?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

/// Asset sizes must be a power of two in `[16, 4096]`.
fn validate_size(size: u32) -> Result<(), Error> {
    if !size.is_power_of_two() || !(16..=4096).contains(&size) {
        return Err(Error::Validation(format!(
            "asset size must be a power of two between 16 and 4096, got {size}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
