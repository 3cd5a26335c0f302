//! Error types for certificate decoding and registry loading.

use std::fmt;
use std::path::PathBuf;

/// Which size table an unrecognized algorithm code was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmField {
    Signature,
    PublicKey,
}

impl fmt::Display for AlgorithmField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => f.write_str("signature type"),
            Self::PublicKey => f.write_str("public key type"),
        }
    }
}

/// Certificate database errors.
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    /// Signature or key type code not present in the size tables.
    #[error("unknown {field} {code:#x}")]
    UnknownAlgorithm { field: AlgorithmField, code: u32 },

    /// Not enough bytes for a declared field.
    #[error("truncated {field}: need {needed} bytes, have {available}")]
    TruncatedBuffer {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// A field's length disagrees with what the format allows.
    #[error("{field} is {actual} bytes, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The envelope did not yield a usable data block.
    #[error("malformed container: {message}")]
    MalformedContainer { message: String },

    /// Database header magic is not `CERT`.
    #[error("bad database magic {found:#010x}")]
    BadMagic { found: u32 },

    /// Header declares more data than the block holds.
    #[error("header declares {declared} bytes but only {available} are present")]
    CorruptDeclaredSize { declared: usize, available: usize },

    /// A record inside the database failed to decode.
    #[error("malformed certificate record at offset {offset:#x}")]
    MalformedRecord {
        offset: usize,
        #[source]
        source: Box<CertError>,
    },

    /// Certificates needed downstream are absent from the database.
    #[error("missing required certificate(s): {}", .missing.join(", "))]
    MissingRequiredCertificate { missing: Vec<String> },

    /// The output sink rejected a write or seek.
    #[error("failed to write certificate {stage}")]
    SinkWriteFailure {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Lookup on an unloaded registry or an absent name.
    #[error("certificate not found or registry not loaded: {name}")]
    NotFoundOrUnloaded { name: String },

    /// Reading the database file failed.
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Database file exceeds the configured size limit.
    #[error("{} is {size} bytes, limit is {limit}", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Loader configuration could not be parsed.
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Fieldless classification of [`CertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownAlgorithm,
    TruncatedBuffer,
    LengthMismatch,
    MalformedContainer,
    BadMagic,
    CorruptDeclaredSize,
    MalformedRecord,
    MissingRequiredCertificate,
    SinkWriteFailure,
    NotFoundOrUnloaded,
    Io,
    FileTooLarge,
    Config,
}

impl CertError {
    /// Failure class, for callers that branch on it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAlgorithm { .. } => ErrorKind::UnknownAlgorithm,
            Self::TruncatedBuffer { .. } => ErrorKind::TruncatedBuffer,
            Self::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Self::MalformedContainer { .. } => ErrorKind::MalformedContainer,
            Self::BadMagic { .. } => ErrorKind::BadMagic,
            Self::CorruptDeclaredSize { .. } => ErrorKind::CorruptDeclaredSize,
            Self::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Self::MissingRequiredCertificate { .. } => ErrorKind::MissingRequiredCertificate,
            Self::SinkWriteFailure { .. } => ErrorKind::SinkWriteFailure,
            Self::NotFoundOrUnloaded { .. } => ErrorKind::NotFoundOrUnloaded,
            Self::Io { .. } => ErrorKind::Io,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether the error means the database content itself is damaged.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::UnknownAlgorithm { .. }
                | Self::TruncatedBuffer { .. }
                | Self::MalformedContainer { .. }
                | Self::BadMagic { .. }
                | Self::CorruptDeclaredSize { .. }
                | Self::MalformedRecord { .. }
        )
    }
}

/// Result type for certificate operations.
pub type CertResult<T> = Result<T, CertError>;
