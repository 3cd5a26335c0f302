//! End-to-end registry loading from database files on disk.

use std::fs;
use std::path::PathBuf;

use certdb::{
    Certificate, CertificateBody, CertificateDatabase, CertificateRegistry, CertError, ErrorKind,
    LoaderConfig, PublicKeyType, SignatureType,
};
use tempfile::TempDir;

fn cert(issuer: &str, name: &str, signature_type: SignatureType, key_type: PublicKeyType) -> Certificate {
    Certificate::new(
        signature_type,
        vec![0x5C; signature_type.size()],
        CertificateBody::new(issuer, name, key_type),
        vec![0xC5; key_type.size()],
    )
    .unwrap()
}

/// Root CA, ticket signer and TMD signer, as found in a console's certs.db.
fn package_chain() -> Vec<Certificate> {
    vec![
        cert("Root", "CA00000003", SignatureType::Rsa4096Sha256, PublicKeyType::Rsa2048),
        cert("Root-CA00000003", "XS0000000c", SignatureType::Rsa2048Sha256, PublicKeyType::Rsa2048),
        cert("Root-CA00000003", "CP0000000b", SignatureType::Rsa2048Sha256, PublicKeyType::Rsa2048),
        cert("Root-CA00000003", "MS00000008", SignatureType::Rsa2048Sha256, PublicKeyType::Ecc),
    ]
}

fn write_db(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn raw_header(magic: &[u8; 4], size: u32) -> Vec<u8> {
    let mut out = magic.to_vec();
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out
}

#[test]
fn test_load_real_shaped_database() {
    let dir = TempDir::new().unwrap();
    let db = CertificateDatabase::from_certificates(package_chain());
    let path = write_db(&dir, "certs.db", &db.to_bytes().unwrap());

    let mut registry = CertificateRegistry::default();
    registry.load(&path).unwrap();

    assert!(registry.is_loaded());
    assert_eq!(registry.len(), 4);
    let ca = registry.get("CA00000003").unwrap();
    assert_eq!(ca.body().issuer(), "Root");
    assert_eq!(ca.signature_type(), SignatureType::Rsa4096Sha256);
    assert_eq!(registry.get("MS00000008").unwrap().key_type(), PublicKeyType::Ecc);
}

#[test]
fn test_load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = CertificateDatabase::from_certificates(package_chain());
    let path = write_db(&dir, "certs.db", &db.to_bytes().unwrap());

    let mut first = CertificateRegistry::default();
    first.load(&path).unwrap();
    let mut second = CertificateRegistry::default();
    second.load(&path).unwrap();
    second.load(&path).unwrap();

    assert_eq!(first.names(), second.names());
    for name in first.names() {
        assert_eq!(first.get(&name).unwrap(), second.get(&name).unwrap());
    }
}

#[test]
fn test_missing_required_certificate() {
    let dir = TempDir::new().unwrap();
    let chain: Vec<_> = package_chain()
        .into_iter()
        .filter(|c| c.name() != "CP0000000b")
        .collect();
    let path = write_db(
        &dir,
        "certs.db",
        &CertificateDatabase::from_certificates(chain).to_bytes().unwrap(),
    );

    let mut registry = CertificateRegistry::default();
    let err = registry.load(&path).unwrap_err();

    match &err {
        CertError::MissingRequiredCertificate { missing } => {
            assert_eq!(missing, &vec!["CP0000000b".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!registry.is_loaded());
    for name in ["CA00000003", "XS0000000c", "CP0000000b", "MS00000008"] {
        assert_eq!(registry.get(name).unwrap_err().kind(), ErrorKind::NotFoundOrUnloaded);
    }
}

#[test]
fn test_empty_database_with_empty_required_list() {
    let dir = TempDir::new().unwrap();
    let path = write_db(&dir, "certs.db", &raw_header(b"CERT", 0));

    let mut registry = CertificateRegistry::new(LoaderConfig::default().with_required(Vec::<String>::new()));
    registry.load(&path).unwrap();

    assert!(registry.is_loaded());
    assert!(registry.is_empty());
}

#[test]
fn test_empty_database_with_default_required_list() {
    let dir = TempDir::new().unwrap();
    let path = write_db(&dir, "certs.db", &raw_header(b"CERT", 0));

    let mut registry = CertificateRegistry::default();
    let err = registry.load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredCertificate);
}

#[test]
fn test_declared_size_past_eof() {
    let dir = TempDir::new().unwrap();
    let path = write_db(&dir, "certs.db", &raw_header(b"CERT", 0x400));

    let mut registry = CertificateRegistry::new(LoaderConfig::default().with_required(Vec::<String>::new()));
    let err = registry.load(&path).unwrap_err();
    assert!(matches!(
        err,
        CertError::CorruptDeclaredSize {
            declared: 0x410,
            available: 0x10
        }
    ));
    assert!(!registry.is_loaded());
}

#[test]
fn test_magic_one_byte_off() {
    let dir = TempDir::new().unwrap();
    let mut bytes = CertificateDatabase::from_certificates(package_chain())
        .to_bytes()
        .unwrap();
    bytes[3] = b'S';
    let path = write_db(&dir, "certs.db", &bytes);

    let mut registry = CertificateRegistry::default();
    let err = registry.load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadMagic);
}

#[test]
fn test_corrupt_record_rejects_whole_database() {
    let dir = TempDir::new().unwrap();
    let mut bytes = CertificateDatabase::from_certificates(package_chain())
        .to_bytes()
        .unwrap();
    // Records are sorted by name, so the last one is XS0000000c; chop its key.
    bytes.truncate(bytes.len() - 8);
    let declared = (bytes.len() - certdb::HEADER_SIZE) as u32;
    bytes[4..8].copy_from_slice(&declared.to_le_bytes());
    let path = write_db(&dir, "certs.db", &bytes);

    let mut registry = CertificateRegistry::default();
    let err = registry.load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    assert!(err.is_integrity_failure());
    assert!(!registry.is_loaded());
    assert!(registry.is_empty());
}

#[test]
fn test_empty_file_is_malformed_container() {
    let dir = TempDir::new().unwrap();
    let path = write_db(&dir, "certs.db", &[]);

    let mut registry = CertificateRegistry::default();
    let err = registry.load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedContainer);
}

#[test]
fn test_config_file_drives_required_list() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("certdb.yaml");
    fs::write(&config_path, "required_certificates:\n  - MS00000008\n").unwrap();
    let config = LoaderConfig::from_file(&config_path).unwrap();

    let only_ms = package_chain()
        .into_iter()
        .filter(|c| c.name() == "MS00000008");
    let path = write_db(
        &dir,
        "certs.db",
        &CertificateDatabase::from_certificates(only_ms).to_bytes().unwrap(),
    );

    let mut registry = CertificateRegistry::new(config);
    registry.load(&path).unwrap();
    assert_eq!(registry.names(), vec!["MS00000008"]);
}

#[test]
fn test_database_written_through_file_sink() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("certs.db");
    let db = CertificateDatabase::from_certificates(package_chain());

    let mut file = fs::File::create(&path).unwrap();
    db.write_to(&mut file).unwrap();
    drop(file);

    assert_eq!(fs::read(&path).unwrap(), db.to_bytes().unwrap());

    let mut registry = CertificateRegistry::default();
    registry.load(&path).unwrap();
    assert_eq!(registry.len(), db.len());
}
