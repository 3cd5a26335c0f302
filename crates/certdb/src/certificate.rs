//! Certificate record codec.
//!
//! On-disk layout of one record, offsets relative to the record start:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | signature type (LE) |
//! | 4 | table | signature |
//! | .. | .. | zero padding up to the next 0x40 boundary |
//! | body | 0x88 | body: issuer, key type (LE), name, expiration (LE) |
//! | body + 0x88 | table | public key |

use std::fmt;
use std::io::{Seek, SeekFrom, Write};

use sha2::{Digest, Sha256};

use crate::error::{AlgorithmField, CertError, CertResult};
use crate::reader::{align_up, Reader};
use crate::sizes::{PublicKeyType, SignatureType};

/// Bodies start on this boundary, measured from the record start.
pub const BODY_ALIGNMENT: usize = 0x40;
/// Serialized size of [`CertificateBody`].
pub const BODY_SIZE: usize = 0x88;
/// Width of the fixed issuer and name fields.
pub const NAME_LEN: usize = 0x40;

const SIGNATURE_TYPE_LEN: usize = 4;

/// Fixed-size certificate body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBody {
    /// Zero-padded issuer chain, e.g. `Root-CA00000003`.
    pub issuer: [u8; NAME_LEN],
    pub key_type: PublicKeyType,
    /// Zero-padded certificate name, the registry key.
    pub name: [u8; NAME_LEN],
    /// Opaque, carried through unchanged.
    pub expiration: u32,
}

impl CertificateBody {
    /// Builds a body from text fields. Input longer than the fixed width is cut off.
    pub fn new(issuer: &str, name: &str, key_type: PublicKeyType) -> Self {
        Self {
            issuer: fixed_field(issuer),
            key_type,
            name: fixed_field(name),
            expiration: 0,
        }
    }

    /// Certificate name up to the first NUL.
    pub fn name(&self) -> String {
        zero_terminated(&self.name)
    }

    /// Issuer up to the first NUL.
    pub fn issuer(&self) -> String {
        zero_terminated(&self.issuer)
    }

    fn decode(r: &mut Reader<'_>) -> CertResult<Self> {
        let issuer = r.read_array::<NAME_LEN>("issuer")?;
        let key_code = r.read_u32le("key type")?;
        let name = r.read_array::<NAME_LEN>("name")?;
        let expiration = r.read_u32le("expiration")?;

        let key_type =
            PublicKeyType::from_code(key_code).ok_or(CertError::UnknownAlgorithm {
                field: AlgorithmField::PublicKey,
                code: key_code,
            })?;

        Ok(Self {
            issuer,
            key_type,
            name,
            expiration,
        })
    }

    fn to_bytes(&self) -> [u8; BODY_SIZE] {
        let mut out = [0u8; BODY_SIZE];
        out[..0x40].copy_from_slice(&self.issuer);
        out[0x40..0x44].copy_from_slice(&self.key_type.code().to_le_bytes());
        out[0x44..0x84].copy_from_slice(&self.name);
        out[0x84..].copy_from_slice(&self.expiration.to_le_bytes());
        out
    }
}

/// A decoded certificate record.
///
/// Signature and public key lengths always agree with their type codes, so
/// every `Certificate` encodes to bytes that [`Certificate::decode`] accepts.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    signature_type: SignatureType,
    signature: Vec<u8>,
    body: CertificateBody,
    public_key: Vec<u8>,
}

impl Certificate {
    /// Assembles a certificate, checking field lengths against the size tables.
    pub fn new(
        signature_type: SignatureType,
        signature: Vec<u8>,
        body: CertificateBody,
        public_key: Vec<u8>,
    ) -> CertResult<Self> {
        if signature.len() != signature_type.size() {
            return Err(CertError::LengthMismatch {
                field: "signature",
                expected: signature_type.size(),
                actual: signature.len(),
            });
        }
        if public_key.len() != body.key_type.size() {
            return Err(CertError::LengthMismatch {
                field: "public key",
                expected: body.key_type.size(),
                actual: public_key.len(),
            });
        }

        Ok(Self {
            signature_type,
            signature,
            body,
            public_key,
        })
    }

    /// Decodes one record starting at `offset`.
    ///
    /// Returns the certificate and the number of bytes it occupies.
    pub fn decode(buffer: &[u8], offset: usize) -> CertResult<(Self, usize)> {
        let mut r = Reader::new(buffer.get(offset..).unwrap_or_default());

        let code = r.read_u32le("signature type")?;
        let signature_type =
            SignatureType::from_code(code).ok_or(CertError::UnknownAlgorithm {
                field: AlgorithmField::Signature,
                code,
            })?;

        let body_start = body_offset(signature_type);
        let body_end = body_start + BODY_SIZE;
        r.ensure(body_end - r.position(), "certificate body")?;

        let signature = r.read_bytes(signature_type.size(), "signature")?.to_vec();
        r.skip_to(body_start, "signature padding")?;
        let body = CertificateBody::decode(&mut r)?;

        let public_key = r.read_bytes(body.key_type.size(), "public key")?.to_vec();

        let consumed = r.position();
        Ok((
            Self {
                signature_type,
                signature,
                body,
                public_key,
            },
            consumed,
        ))
    }

    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn body(&self) -> &CertificateBody {
        &self.body
    }

    pub fn key_type(&self) -> PublicKeyType {
        self.body.key_type
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Registry key: the body name up to its first NUL.
    pub fn name(&self) -> String {
        self.body.name()
    }

    /// Offset of the body from the start of the record.
    pub fn body_offset(&self) -> usize {
        body_offset(self.signature_type)
    }

    /// Total size of the encoded record.
    pub fn encoded_len(&self) -> usize {
        self.body_offset() + BODY_SIZE + self.public_key.len()
    }

    /// Writes the record to a seekable sink.
    ///
    /// The padding between signature and body is skipped with a relative
    /// seek, so its content is whatever the sink holds there (zero for a
    /// fresh file or an in-memory cursor).
    pub fn write_to<W: Write + Seek>(&self, sink: &mut W) -> CertResult<()> {
        sink.write_all(&self.signature_type.code().to_le_bytes())
            .and_then(|()| sink.write_all(&self.signature))
            .map_err(sink_err("signature"))?;

        let padding = self.body_offset() - SIGNATURE_TYPE_LEN - self.signature.len();
        sink.seek(SeekFrom::Current(padding as i64))
            .and_then(|_| sink.write_all(&self.body.to_bytes()))
            .map_err(sink_err("body"))?;

        sink.write_all(&self.public_key)
            .map_err(sink_err("public key"))?;

        Ok(())
    }

    /// Encodes the record into a fresh buffer, padding with zeros.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.signature_type.code().to_le_bytes());
        out.extend_from_slice(&self.signature);
        out.resize(self.body_offset(), 0);
        out.extend_from_slice(&self.body.to_bytes());
        out.extend_from_slice(&self.public_key);
        out
    }

    /// SHA-256 of the encoded record, as `sha256:<hex>`.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_bytes());
        format!("sha256:{}", hex::encode(digest))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("name", &self.name())
            .field("issuer", &self.body.issuer())
            .field("signature_type", &self.signature_type)
            .field("key_type", &self.body.key_type)
            .field("signature_len", &self.signature.len())
            .field("public_key_len", &self.public_key.len())
            .finish()
    }
}

fn sink_err(stage: &'static str) -> impl FnOnce(std::io::Error) -> CertError {
    move |source| CertError::SinkWriteFailure { stage, source }
}

fn body_offset(signature_type: SignatureType) -> usize {
    align_up(SIGNATURE_TYPE_LEN + signature_type.size(), BODY_ALIGNMENT)
}

fn fixed_field(s: &str) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    let n = s.len().min(NAME_LEN);
    out[..n].copy_from_slice(&s.as_bytes()[..n]);
    out
}

fn zero_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
