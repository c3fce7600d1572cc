//! Where raw structure text comes from.
//!
//! Sources are blocking; the loader runs them on a background thread.
//! [`FallbackSource`] chains a primary and a secondary source, and
//! [`CachingSource`] fronts any source with a local directory.

use std::fmt;
use std::path::{Path, PathBuf};

use super::StructureId;
use crate::options::SourceOptions;

/// Upper bound on downloaded structure size.
#[cfg(feature = "fetch")]
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Failure to obtain structure text from one source.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure.
    Transport {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// Server answered with a non-success status.
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        code: u16,
    },
    /// Local file could not be read.
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Both the primary and the fallback source failed.
    Exhausted {
        /// Primary failure.
        primary: Box<FetchError>,
        /// Fallback failure.
        fallback: Box<FetchError>,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, message } => {
                write!(f, "request to {url} failed: {message}")
            }
            Self::Status { url, code } => {
                write!(f, "{url} answered with status {code}")
            }
            Self::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            Self::Exhausted { primary, fallback } => {
                write!(f, "{primary}; fallback: {fallback}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Exhausted { fallback, .. } => Some(fallback.as_ref()),
            Self::Transport { .. } | Self::Status { .. } => None,
        }
    }
}

/// A blocking provider of raw PDB text.
pub trait StructureSource: Send + Sync {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Fetch the full text of structure `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why the text is unavailable.
    fn fetch(&self, id: &StructureId) -> Result<String, FetchError>;
}

/// HTTP GET against a URL template containing `{id}` / `{id_lower}`.
#[cfg(feature = "fetch")]
pub struct HttpSource {
    name: String,
    url_template: String,
    agent: ureq::Agent,
}

#[cfg(feature = "fetch")]
impl HttpSource {
    /// Create a source with a global request timeout.
    #[must_use]
    pub fn new(
        name: &str,
        url_template: &str,
        timeout: std::time::Duration,
    ) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            name: name.to_owned(),
            url_template: url_template.to_owned(),
            agent,
        }
    }
}

#[cfg(feature = "fetch")]
impl StructureSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, id: &StructureId) -> Result<String, FetchError> {
        let url = id.fill(&self.url_template);
        log::info!("Downloading {id} from {}...", self.name);

        let response = self.agent.get(&url).call().map_err(|e| match e {
            ureq::Error::StatusCode(code) => FetchError::Status {
                url: url.clone(),
                code,
            },
            other => FetchError::Transport {
                url: url.clone(),
                message: other.to_string(),
            },
        })?;

        let mut body = response.into_body();
        body.with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| FetchError::Transport {
                url,
                message: e.to_string(),
            })
    }
}

/// Reads `{dir}/{id_lower}.pdb` from disk.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Source rooted at `dir`.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Path a structure would be stored at.
    #[must_use]
    pub fn path_for(&self, id: &StructureId) -> PathBuf {
        self.dir.join(id.fill("{id_lower}.pdb"))
    }

    /// Write structure text into the directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn store(&self, id: &StructureId, text: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(id), text)
    }
}

impl StructureSource for DirectorySource {
    fn name(&self) -> &str {
        "local cache"
    }

    fn fetch(&self, id: &StructureId) -> Result<String, FetchError> {
        let path = self.path_for(id);
        std::fs::read_to_string(&path)
            .map_err(|source| FetchError::Io { path, source })
    }
}

/// Tries `primary`, then `fallback`.
pub struct FallbackSource {
    primary: Box<dyn StructureSource>,
    fallback: Box<dyn StructureSource>,
}

impl FallbackSource {
    /// Chain two sources.
    #[must_use]
    pub fn new(
        primary: Box<dyn StructureSource>,
        fallback: Box<dyn StructureSource>,
    ) -> Self {
        Self { primary, fallback }
    }
}

impl StructureSource for FallbackSource {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn fetch(&self, id: &StructureId) -> Result<String, FetchError> {
        match self.primary.fetch(id) {
            Ok(text) => Ok(text),
            Err(primary) => {
                log::warn!(
                    "{} failed for {id} ({primary}), trying {}",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.fetch(id).map_err(|fallback| {
                    FetchError::Exhausted {
                        primary: Box::new(primary),
                        fallback: Box::new(fallback),
                    }
                })
            }
        }
    }
}

/// Serves from a local directory when possible, otherwise from `inner`,
/// writing successful downloads back to the directory.
pub struct CachingSource {
    cache: DirectorySource,
    inner: Box<dyn StructureSource>,
}

impl CachingSource {
    /// Front `inner` with `cache`.
    #[must_use]
    pub fn new(cache: DirectorySource, inner: Box<dyn StructureSource>) -> Self {
        Self { cache, inner }
    }
}

impl StructureSource for CachingSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, id: &StructureId) -> Result<String, FetchError> {
        if let Ok(text) = self.cache.fetch(id) {
            log::debug!("{id} served from {}", self.cache.dir.display());
            return Ok(text);
        }
        let text = self.inner.fetch(id)?;
        if let Err(e) = self.cache.store(id, &text) {
            log::warn!("could not cache {id}: {e}");
        }
        Ok(text)
    }
}

/// Build the configured source chain: optional cache directory, then the
/// public download endpoint, then the local proxy.
#[must_use]
pub fn default_source(options: &SourceOptions) -> Box<dyn StructureSource> {
    #[cfg(feature = "fetch")]
    let remote: Option<Box<dyn StructureSource>> = {
        let timeout = std::time::Duration::from_secs(options.timeout_secs);
        Some(Box::new(FallbackSource::new(
            Box::new(HttpSource::new("RCSB", &options.primary_url, timeout)),
            Box::new(HttpSource::new("proxy", &options.proxy_url, timeout)),
        )))
    };
    #[cfg(not(feature = "fetch"))]
    let remote: Option<Box<dyn StructureSource>> = None;

    match (options.cache_dir.as_deref(), remote) {
        (Some(dir), Some(remote)) => {
            Box::new(CachingSource::new(DirectorySource::new(dir), remote))
        }
        (None, Some(remote)) => remote,
        (Some(dir), None) => Box::new(DirectorySource::new(dir)),
        (None, None) => Box::new(DirectorySource::new(Path::new("assets/models"))),
    }
}
