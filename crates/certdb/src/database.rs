//! Certificate database parsing.
//!
//! A database block is a 16-byte header followed by packed certificate
//! records:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic, `CERT` |
//! | 4 | 4 | payload size in bytes, header excluded (LE) |
//! | 8 | 8 | reserved |
//! | 16 | size | certificate records |
//!
//! Parsing is all-or-nothing: a single bad record rejects the database.

use std::collections::HashMap;
use std::io::{Seek, Write};

use tracing::{debug, warn};

use crate::certificate::Certificate;
use crate::error::{CertError, CertResult};
use crate::reader::Reader;

/// `CERT` as a little-endian word.
pub const DATABASE_MAGIC: u32 = u32::from_le_bytes(*b"CERT");
/// Size of the database header.
pub const HEADER_SIZE: usize = 0x10;

/// Fixed header at the start of a database block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseHeader {
    pub magic: u32,
    /// Payload size, header excluded.
    pub size: u32,
}

impl DatabaseHeader {
    pub fn parse(block: &[u8]) -> CertResult<Self> {
        let mut r = Reader::new(block);
        r.ensure(HEADER_SIZE, "database header")?;
        let magic = r.read_u32le("magic")?;
        let size = r.read_u32le("payload size")?;
        Ok(Self { magic, size })
    }

    /// Header size plus declared payload.
    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.size as usize
    }

    fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.magic.to_le_bytes());
        out[4..8].copy_from_slice(&self.size.to_le_bytes());
        out
    }
}

/// Name-keyed set of certificates parsed from one database block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateDatabase {
    certs: HashMap<String, Certificate>,
}

impl CertificateDatabase {
    /// Parse a database block: header, then records until the declared size is used up.
    pub fn parse(block: &[u8]) -> CertResult<Self> {
        if block.len() < HEADER_SIZE {
            return Err(CertError::MalformedContainer {
                message: format!(
                    "data block is {} bytes, smaller than the database header",
                    block.len()
                ),
            });
        }

        let header = DatabaseHeader::parse(block)?;
        if header.magic != DATABASE_MAGIC {
            return Err(CertError::BadMagic {
                found: header.magic,
            });
        }

        let total_size = header.total_size();
        if block.len() < total_size {
            return Err(CertError::CorruptDeclaredSize {
                declared: total_size,
                available: block.len(),
            });
        }

        let records = &block[..total_size];
        let mut certs = HashMap::new();
        let mut pos = HEADER_SIZE;
        while pos < total_size {
            let (cert, consumed) = Certificate::decode(records, pos).map_err(|e| {
                CertError::MalformedRecord {
                    offset: pos,
                    source: Box::new(e),
                }
            })?;

            let name = cert.name();
            debug!(name = %name, offset = pos, len = consumed, "decoded certificate");
            if let Some(previous) = certs.insert(name.clone(), cert) {
                warn!(name = %name, replaced = %previous.fingerprint(), "duplicate certificate name, keeping later record");
            }

            pos += consumed;
        }

        Ok(Self { certs })
    }

    /// Build a database from certificates. Later duplicates win.
    pub fn from_certificates(certs: impl IntoIterator<Item = Certificate>) -> Self {
        Self {
            certs: certs.into_iter().map(|c| (c.name(), c)).collect(),
        }
    }

    /// Fails with every name in `required` that is absent.
    pub fn check_required<S: AsRef<str>>(&self, required: &[S]) -> CertResult<()> {
        let missing: Vec<String> = required
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.certs.contains_key(*name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CertError::MissingRequiredCertificate { missing })
        }
    }

    pub fn get(&self, name: &str) -> Option<&Certificate> {
        self.certs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.certs.contains_key(name)
    }

    /// Certificate names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.certs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Certificate)> {
        self.certs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn into_map(self) -> HashMap<String, Certificate> {
        self.certs
    }

    fn sorted(&self) -> Vec<&Certificate> {
        let mut certs: Vec<&Certificate> = self.certs.values().collect();
        certs.sort_by_key(|c| c.name());
        certs
    }

    fn header(&self) -> CertResult<DatabaseHeader> {
        let payload: usize = self.certs.values().map(Certificate::encoded_len).sum();
        let size = u32::try_from(payload).map_err(|_| CertError::LengthMismatch {
            field: "database payload",
            expected: u32::MAX as usize,
            actual: payload,
        })?;
        Ok(DatabaseHeader {
            magic: DATABASE_MAGIC,
            size,
        })
    }

    /// Writes header and records, ordered by name, to a seekable sink.
    pub fn write_to<W: Write + Seek>(&self, sink: &mut W) -> CertResult<()> {
        let header = self.header()?;
        sink.write_all(&header.to_bytes())
            .map_err(|source| CertError::SinkWriteFailure {
                stage: "database header",
                source,
            })?;
        for cert in self.sorted() {
            cert.write_to(sink)?;
        }
        Ok(())
    }

    /// Encodes header and records, ordered by name.
    pub fn to_bytes(&self) -> CertResult<Vec<u8>> {
        let header = self.header()?;
        let mut out = Vec::with_capacity(header.total_size());
        out.extend_from_slice(&header.to_bytes());
        for cert in self.sorted() {
            out.extend_from_slice(&cert.to_bytes());
        }
        Ok(out)
    }
}

/// Loads a database from container blocks and checks the required names.
///
/// Only the first block carries certificate data.
pub fn load_blocks<S: AsRef<str>>(
    blocks: &[Vec<u8>],
    required: &[S],
) -> CertResult<CertificateDatabase> {
    let block = blocks.first().ok_or_else(|| CertError::MalformedContainer {
        message: "container has no data blocks".to_string(),
    })?;

    let db = CertificateDatabase::parse(block)?;
    db.check_required(required)?;
    Ok(db)
}
