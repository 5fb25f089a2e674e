//! Loading the external rendering module
//!
//! The module is a WebAssembly binary built elsewhere. This side only needs
//! to find it, fetch it, make sure it really is a wasm binary, and record a
//! fingerprint so logs identify exactly which build was started.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use log::debug;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{Error, Result};

/// Where development builds expect the module when nothing else is configured
pub const DEFAULT_MODULE_PATH: &str = "pkg/perlin-wave_bg.wasm";

/// Leading bytes of every WebAssembly binary
pub const WASM_MAGIC: [u8; 4] = *b"\0asm";

/// Default time allowed for fetching a module
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30000;

/// Location of a module binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    File(PathBuf),
    Url(Url),
}

impl ModuleSource {
    /// Interpret `location` as an absolute URL, or relative to `base` when one
    /// is given, or else as a filesystem path.
    pub fn resolve(location: &str, base: Option<&Url>) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::ConfigError("module location is empty".into()));
        }

        let url = match Url::parse(location) {
            Ok(url) => Some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => Some(base.join(location).map_err(|e| {
                    Error::ConfigError(format!("cannot resolve '{}' against {}: {}", location, base, e))
                })?),
                None => None,
            },
            Err(e) => {
                return Err(Error::ConfigError(format!("invalid module location '{}': {}", location, e)))
            }
        };

        match url {
            None => Ok(ModuleSource::File(PathBuf::from(location))),
            Some(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(ModuleSource::File)
                .map_err(|_| Error::ConfigError(format!("invalid file URL '{}'", url))),
            Some(url) if matches!(url.scheme(), "http" | "https") => Ok(ModuleSource::Url(url)),
            // Windows drive letters parse as a one-letter scheme.
            Some(url) if url.scheme().len() == 1 => Ok(ModuleSource::File(PathBuf::from(location))),
            Some(url) => Err(Error::ConfigError(format!(
                "unsupported module scheme '{}'",
                url.scheme()
            ))),
        }
    }
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSource::File(path) => write!(f, "{}", path.display()),
            ModuleSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A fetched, verified module binary
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub source: ModuleSource,
    pub bytes: Vec<u8>,
    /// Hex-encoded SHA-256 of `bytes`
    pub digest: String,
    /// Binary format version from the header
    pub version: u32,
}

impl LoadedModule {
    pub fn from_bytes(source: ModuleSource, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < 8 || bytes[..4] != WASM_MAGIC {
            return Err(Error::ModuleInitError(format!(
                "{} is not a WebAssembly binary",
                source
            )));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let digest = hex::encode(Sha256::digest(&bytes));
        Ok(Self {
            source,
            bytes,
            digest,
            version,
        })
    }

    /// First 12 hex digits of the digest, for log lines
    pub fn short_digest(&self) -> &str {
        &self.digest[..self.digest.len().min(12)]
    }
}

/// Fetches module binaries asynchronously.
pub trait ModuleLoader {
    fn load<'a>(&'a self, source: &'a ModuleSource) -> BoxFuture<'a, Result<LoadedModule>>;
}

/// Loads modules from disk or over HTTP.
pub struct WasmLoader {
    timeout_ms: u64,
    #[cfg(feature = "fetch")]
    client: reqwest::Client,
}

impl WasmLoader {
    pub fn new(timeout_ms: u64) -> Result<Self> {
        #[cfg(feature = "fetch")]
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::ModuleInitError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            timeout_ms,
            #[cfg(feature = "fetch")]
            client,
        })
    }

    async fn fetch_bytes(&self, source: &ModuleSource) -> Result<Vec<u8>> {
        match source {
            ModuleSource::File(path) => tokio::fs::read(path).await.map_err(|e| {
                Error::ModuleInitError(format!("cannot read {}: {}", path.display(), e))
            }),
            #[cfg(feature = "fetch")]
            ModuleSource::Url(url) => {
                let resp = self
                    .client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(resp.bytes().await?.to_vec())
            }
            #[cfg(not(feature = "fetch"))]
            ModuleSource::Url(url) => Err(Error::ModuleInitError(format!(
                "cannot fetch {}: built without the `fetch` feature",
                url
            ))),
        }
    }
}

impl ModuleLoader for WasmLoader {
    fn load<'a>(&'a self, source: &'a ModuleSource) -> BoxFuture<'a, Result<LoadedModule>> {
        async move {
            debug!("loading module from {}", source);
            let limit = Duration::from_millis(self.timeout_ms);
            let bytes = tokio::time::timeout(limit, self.fetch_bytes(source))
                .await
                .map_err(|_| Error::Timeout(self.timeout_ms))??;
            LoadedModule::from_bytes(source.clone(), bytes)
        }
        .boxed()
    }
}
