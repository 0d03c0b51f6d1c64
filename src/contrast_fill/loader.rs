use std::path::PathBuf;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;

use crate::error::LoadError;

/// Where a source image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Image file on the local filesystem
    Path(PathBuf),
    /// Encoded image bytes already in memory
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` URI
    DataUrl(String),
    /// `scheme://` URL, such as `https://`, left to loaders that can fetch it
    Url(String),
}

impl ImageSource {
    /// Interprets a source identifier.
    ///
    /// `data:` URIs are kept as such, `file://` URLs become paths, other
    /// `scheme://` identifiers become [`ImageSource::Url`], and anything else
    /// is treated as a filesystem path.
    pub fn parse(identifier: &str) -> Self {
        if identifier.starts_with("data:") {
            return Self::DataUrl(identifier.to_owned());
        }
        if let Some(path) = identifier.strip_prefix("file://") {
            return Self::Path(PathBuf::from(path));
        }
        match url_scheme(identifier) {
            Some(_) => Self::Url(identifier.to_owned()),
            None => Self::Path(PathBuf::from(identifier)),
        }
    }
}

/// Returns the scheme of a `scheme://rest` identifier.
fn url_scheme(identifier: &str) -> Option<&str> {
    let (scheme, _) = identifier.split_once("://")?;
    let mut chars = scheme.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (starts_with_letter && valid).then_some(scheme)
}

impl From<&str> for ImageSource {
    fn from(identifier: &str) -> Self {
        Self::parse(identifier)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Resolves a source into a fully decoded image.
///
/// The returned future is the point where processing waits for the image to
/// become ready. It must fail rather than hang when the source is unreachable
/// or undecodable.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError>;
}

/// Loader for paths, raw bytes and `data:` URIs.
///
/// Decoding runs on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoader;

#[async_trait]
impl ImageLoader for DefaultLoader {
    async fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError> {
        let bytes = match source {
            ImageSource::Path(path) => tokio::fs::read(path).await?,
            ImageSource::Bytes(bytes) => bytes.clone(),
            ImageSource::DataUrl(url) => decode_data_url(url)?,
            ImageSource::Url(url) => {
                let scheme = url_scheme(url).unwrap_or(url.as_str());
                return Err(LoadError::InvalidSource(format!(
                    "`{scheme}` URLs cannot be loaded by the default loader"
                )));
            }
        };

        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| LoadError::Task(e.to_string()))??;

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            "Source image decoded"
        );

        Ok(image)
    }
}

/// Extracts the payload of a base64 `data:` URI.
fn decode_data_url(url: &str) -> Result<Vec<u8>, LoadError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| LoadError::InvalidDataUrl("missing `data:` scheme".to_owned()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LoadError::InvalidDataUrl("missing `,` separator".to_owned()))?;

    if !header.ends_with(";base64") {
        return Err(LoadError::InvalidDataUrl(format!(
            "only base64 payloads are supported, got `{header}`"
        )));
    }

    Ok(STANDARD.decode(payload.trim())?)
}
