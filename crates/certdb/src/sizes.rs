//! Algorithm codes and their serialized lengths.
//!
//! Lookups are total: unrecognized codes yield `None`, never a zero length.

/// Signature algorithm codes found at the start of every record.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureType {
    Rsa4096Sha1 = 0x0001_0000,
    Rsa2048Sha1 = 0x0001_0001,
    EccSha1 = 0x0001_0002,
    Rsa4096Sha256 = 0x0001_0003,
    Rsa2048Sha256 = 0x0001_0004,
    EcdsaSha256 = 0x0001_0005,
}

impl SignatureType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x0001_0000 => Some(Self::Rsa4096Sha1),
            0x0001_0001 => Some(Self::Rsa2048Sha1),
            0x0001_0002 => Some(Self::EccSha1),
            0x0001_0003 => Some(Self::Rsa4096Sha256),
            0x0001_0004 => Some(Self::Rsa2048Sha256),
            0x0001_0005 => Some(Self::EcdsaSha256),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Serialized signature length, including the 0x40 bytes of padding
    /// the format mandates after an ECC signature.
    pub fn size(self) -> usize {
        match self {
            Self::Rsa4096Sha1 | Self::Rsa4096Sha256 => 0x200,
            Self::Rsa2048Sha1 | Self::Rsa2048Sha256 => 0x100,
            Self::EccSha1 | Self::EcdsaSha256 => 0x3C + 0x40,
        }
    }
}

/// Public key algorithm codes carried in the certificate body.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKeyType {
    Rsa4096 = 0,
    Rsa2048 = 1,
    Ecc = 2,
}

impl PublicKeyType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Rsa4096),
            1 => Some(Self::Rsa2048),
            2 => Some(Self::Ecc),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Serialized key length. RSA keys carry 0x34 bytes of padding after
    /// modulus and exponent, ECC keys 0x3C.
    pub fn size(self) -> usize {
        match self {
            Self::Rsa4096 => 0x238,
            Self::Rsa2048 => 0x138,
            Self::Ecc => 0x78,
        }
    }
}

/// Serialized signature length for a raw signature type code.
pub fn signature_size(code: u32) -> Option<usize> {
    SignatureType::from_code(code).map(SignatureType::size)
}

/// Serialized public key length for a raw key type code.
pub fn public_key_size(code: u32) -> Option<usize> {
    PublicKeyType::from_code(code).map(PublicKeyType::size)
}
