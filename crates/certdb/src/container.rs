//! Envelope extraction seam.
//!
//! A database file is usually wrapped in an outer container that has to be
//! verified and unpacked before the certificate data is reachable. The
//! embedding system supplies that logic through [`ContainerExtractor`].

use crate::error::{CertError, CertResult};

/// Turns raw file bytes into decoded data blocks.
pub trait ContainerExtractor: Send + Sync {
    /// Returns the data blocks of the container, in order.
    ///
    /// Implementations signal an invalid container with
    /// [`CertError::MalformedContainer`].
    fn extract(&self, raw: &[u8]) -> CertResult<Vec<Vec<u8>>>;
}

/// Treats the whole file as a single, already decoded block.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainContainer;

impl ContainerExtractor for PlainContainer {
    fn extract(&self, raw: &[u8]) -> CertResult<Vec<Vec<u8>>> {
        if raw.is_empty() {
            return Err(CertError::MalformedContainer {
                message: "empty file".to_string(),
            });
        }
        Ok(vec![raw.to_vec()])
    }
}

impl<F> ContainerExtractor for F
where
    F: Fn(&[u8]) -> CertResult<Vec<Vec<u8>>> + Send + Sync,
{
    fn extract(&self, raw: &[u8]) -> CertResult<Vec<Vec<u8>>> {
        self(raw)
    }
}
