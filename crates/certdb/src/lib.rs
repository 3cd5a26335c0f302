//! Binary certificate database codec and certificate registry.
//!
//! A certificate database is a `CERT`-tagged header followed by packed
//! certificate records (signature, body, public key). This crate provides:
//!
//! - Size tables for the signature and public key algorithm codes
//! - Decoding and encoding of single certificate records
//! - All-or-nothing parsing of a database into a name-keyed set
//! - A registry that loads a database file once and serves lookups
//!
//! No signatures are verified here; consumers use the registry to find the
//! issuer certificates they verify against.
//!
//! # Quick Start
//!
//! ```no_run
//! use certdb::{CertificateRegistry, LoaderConfig};
//!
//! # fn example() -> certdb::CertResult<()> {
//! let mut registry = CertificateRegistry::new(LoaderConfig::default());
//! registry.load("certs.db")?;
//!
//! let ca = registry.get("CA00000003")?;
//! println!("{} issued by {}", ca.name(), ca.body().issuer());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Key | Description |
//! |-----|-------------|
//! | `required_certificates` | Names that must be present (default: `CA00000003`, `XS0000000c`, `CP0000000b`) |
//! | `max_file_bytes` | Largest database file accepted (default: 1 MiB) |

pub mod certificate;
pub mod config;
pub mod container;
pub mod database;
pub mod error;
mod reader;
pub mod registry;
pub mod sizes;

pub use certificate::{Certificate, CertificateBody, BODY_ALIGNMENT, BODY_SIZE, NAME_LEN};
pub use config::{LoaderConfig, DEFAULT_REQUIRED_CERTIFICATES};
pub use container::{ContainerExtractor, PlainContainer};
pub use database::{load_blocks, CertificateDatabase, DatabaseHeader, DATABASE_MAGIC, HEADER_SIZE};
pub use error::{AlgorithmField, CertError, CertResult, ErrorKind};
pub use registry::CertificateRegistry;
pub use sizes::{public_key_size, signature_size, PublicKeyType, SignatureType};
