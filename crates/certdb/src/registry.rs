//! Name-keyed certificate registry.
//!
//! The registry starts empty, is filled by one successful [`load`], is read
//! many times, and is replaced wholesale by the next load. It does no
//! locking of its own: `load` takes `&mut self`, lookups take `&self`, so an
//! embedding system that shares a registry across threads wraps it in a
//! lock of its choosing.
//!
//! [`load`]: CertificateRegistry::load

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::certificate::Certificate;
use crate::config::LoaderConfig;
use crate::container::{ContainerExtractor, PlainContainer};
use crate::database::load_blocks;
use crate::error::{CertError, CertResult};

/// Certificates loaded from a database, looked up by name.
pub struct CertificateRegistry {
    config: LoaderConfig,
    extractor: Box<dyn ContainerExtractor>,
    certs: HashMap<String, Certificate>,
    loaded: bool,
}

impl CertificateRegistry {
    /// Create an empty registry reading plain, unwrapped database files.
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_extractor(config, PlainContainer)
    }

    /// Create an empty registry that unwraps files with `extractor`.
    pub fn with_extractor(config: LoaderConfig, extractor: impl ContainerExtractor + 'static) -> Self {
        Self {
            config,
            extractor: Box::new(extractor),
            certs: HashMap::new(),
            loaded: false,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the database file at `path`, replacing any previous contents.
    ///
    /// On failure the registry is left empty and unloaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> CertResult<()> {
        let path = path.as_ref();
        self.reset();
        debug!(path = %path.display(), "loading certificate database");

        let result = self.read_file(path).and_then(|raw| self.install(&raw));
        if let Err(e) = &result {
            warn!(path = %path.display(), error = %e, "certificate database rejected");
        }
        result
    }

    /// Load from raw file bytes already in memory.
    pub fn load_bytes(&mut self, raw: &[u8]) -> CertResult<()> {
        self.reset();
        let result = self.install(raw);
        if let Err(e) = &result {
            warn!(error = %e, "certificate database rejected");
        }
        result
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up a certificate by name.
    ///
    /// Fails for absent names and for every name while unloaded.
    pub fn get(&self, name: &str) -> CertResult<&Certificate> {
        if !self.loaded {
            return Err(CertError::NotFoundOrUnloaded {
                name: name.to_string(),
            });
        }
        self.certs
            .get(name)
            .ok_or_else(|| CertError::NotFoundOrUnloaded {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaded && self.certs.contains_key(name)
    }

    /// Loaded certificate names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.iter().map(|(name, _)| name.to_string()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        if self.loaded {
            self.certs.len()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loaded certificates, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Certificate)> {
        self.certs
            .iter()
            .filter(|_| self.loaded)
            .map(|(k, v)| (k.as_str(), v))
    }

    fn reset(&mut self) {
        self.certs.clear();
        self.loaded = false;
    }

    fn read_file(&self, path: &Path) -> CertResult<Vec<u8>> {
        let io_err = |source| CertError::Io {
            path: path.to_path_buf(),
            source,
        };

        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > self.config.max_file_bytes {
            return Err(CertError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.config.max_file_bytes,
            });
        }

        std::fs::read(path).map_err(io_err)
    }

    fn install(&mut self, raw: &[u8]) -> CertResult<()> {
        let blocks = self.extractor.extract(raw)?;
        let db = load_blocks(&blocks, &self.config.required_certificates)?;

        debug!(count = db.len(), "certificate database loaded");
        self.certs = db.into_map();
        self.loaded = true;
        Ok(())
    }
}

impl Default for CertificateRegistry {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl fmt::Debug for CertificateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateRegistry")
            .field("loaded", &self.loaded)
            .field("names", &self.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
